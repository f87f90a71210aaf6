//! Synthetic and replayed traffic parameters.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
pub struct SimulatorConfig {
    /// Seed for deterministic generation.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Share of generated events reshaped into an attack pattern.
    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(default = "default_threat_probability")]
    pub threat_probability: f64,

    /// Chaos configuration.
    #[validate(nested)]
    #[serde(default)]
    pub chaos: ChaosConfig,

    /// Recorded scenario to replay instead of generating traffic.
    #[serde(default)]
    pub scenario: Option<PathBuf>,

    /// Restart the scenario from the top once it is exhausted.
    #[serde(default)]
    pub loop_replay: bool,
}

fn default_seed() -> u64 {
    42
}
fn default_threat_probability() -> f64 {
    0.1
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            threat_probability: default_threat_probability(),
            chaos: ChaosConfig::default(),
            scenario: None,
            loop_replay: false,
        }
    }
}

#[derive(Default, Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
pub struct ChaosConfig {
    /// Probability that a source call fails (0.0 to 1.0).
    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(default)]
    pub fault_probability: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fault_probability_is_bounded() {
        let mut config = SimulatorConfig::default();
        config.validate().expect("Default config should be valid");
        config.chaos.fault_probability = 2.0;
        assert!(config.validate().is_err());
    }
}
