//! Observability configuration.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;

/// Telemetry configuration.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
pub struct TelemetryConfig {
    /// Default filter directive; `RUST_LOG` takes precedence when set.
    #[validate(custom(function = validation::validate_log_level))]
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Output layout: `pretty` or `compact`.
    #[validate(custom(function = validation::validate_log_format))]
    #[serde(default = "default_log_format")]
    pub log_format: String,

    #[serde(default = "default_true")]
    pub thread_names: bool,
}

fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "compact".into()
}
fn default_true() -> bool {
    true
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
            thread_names: default_true(),
        }
    }
}
