//! # netvakt Configuration System
//!
//! Hierarchical configuration for the netvakt monitor.
//!
//! ## Features
//! - **Unified Configuration**: one tree for monitor, detection, simulator and telemetry
//! - **Validation**: field ranges and cross-field rules checked before use
//! - **Environment Awareness**: per-environment YAML overlays and `NETVAKT_*` overrides

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

mod detection;
mod error;
mod monitor;
mod simulator;
mod telemetry;
mod validation;

pub use detection::DetectionConfig;
pub use error::ConfigError;
pub use monitor::MonitorConfig;
pub use simulator::{ChaosConfig, SimulatorConfig};
pub use telemetry::TelemetryConfig;

const BASE_FILE: &str = "config/netvakt.yaml";
const ENV_PREFIX: &str = "NETVAKT_";

/// Top‑level configuration container for all netvakt components.
#[derive(Debug, Serialize, Deserialize, Validate, Default, Clone, PartialEq)]
pub struct NetvaktConfig {
    /// Monitor loop sizing, pacing and timeouts.
    #[validate(nested)]
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// Alerting thresholds and classifier input width.
    #[validate(nested)]
    #[serde(default)]
    pub detection: DetectionConfig,

    /// Synthetic traffic and replay parameters.
    #[validate(nested)]
    #[serde(default)]
    pub simulator: SimulatorConfig,

    /// Logging configuration.
    #[validate(nested)]
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl NetvaktConfig {
    /// Load configuration from default files and environment.
    ///
    /// Hierarchy:
    /// 1. Default Values
    /// 2. `config/netvakt.yaml` - Base settings. If missing, defaults are used.
    /// 3. `config/<environment>.yaml` - Environment‑specific overrides
    ///    (`NETVAKT_ENV`, default `production`).
    /// 4. `NETVAKT_*` environment variables, `__` separating levels.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(NetvaktConfig::default()));

        if Path::new(BASE_FILE).exists() {
            figment = figment.merge(Yaml::file(BASE_FILE));
        }

        let env = std::env::var("NETVAKT_ENV").unwrap_or_else(|_| "production".into());
        let env_file = format!("config/{}.yaml", env);
        if Path::new(&env_file).exists() {
            figment = figment.merge(Yaml::file(env_file));
        }

        Self::extract(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Load configuration from a specific file layered over the defaults.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        Self::extract(
            Figment::from(Serialized::defaults(NetvaktConfig::default()))
                .merge(Yaml::file(path))
                .merge(Env::prefixed(ENV_PREFIX).split("__")),
        )
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }
}
