//! Detection thresholds and classifier input shape.

use serde::{Deserialize, Serialize};
use validator::{self, Validate, ValidationError};

/// Alerting policy and model input parameters.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
#[validate(schema(function = "validate_risk_bands"))]
pub struct DetectionConfig {
    /// Alerts require a confidence strictly above this value.
    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,

    /// Confidence at or above which an alert is rated high risk.
    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(default = "default_high_risk")]
    pub high_risk_threshold: f64,

    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(default = "default_medium_risk")]
    pub medium_risk_threshold: f64,

    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(default = "default_low_risk")]
    pub low_risk_threshold: f64,

    /// Number of values the classifier expects. Feature vectors are
    /// zero-padded or truncated to this width.
    #[validate(range(min = 1, max = 4096))]
    #[serde(default = "default_feature_width")]
    pub feature_width: usize,
}

fn default_confidence_threshold() -> f64 {
    0.7
}
fn default_high_risk() -> f64 {
    0.9
}
fn default_medium_risk() -> f64 {
    0.7
}
fn default_low_risk() -> f64 {
    0.5
}
fn default_feature_width() -> usize {
    25
}

fn validate_risk_bands(config: &DetectionConfig) -> Result<(), ValidationError> {
    let ordered = config.low_risk_threshold <= config.medium_risk_threshold
        && config.medium_risk_threshold <= config.high_risk_threshold;
    if ordered {
        Ok(())
    } else {
        Err(ValidationError::new("risk_bands_out_of_order"))
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
            high_risk_threshold: default_high_risk(),
            medium_risk_threshold: default_medium_risk(),
            low_risk_threshold: default_low_risk(),
            feature_width: default_feature_width(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_thresholds() {
        let config = DetectionConfig::default();
        config.validate().expect("Default config should be valid");
        assert_eq!(config.confidence_threshold, 0.7);
        assert_eq!(config.feature_width, 25);
    }

    #[test]
    fn threshold_outside_unit_interval_is_rejected() {
        let config = DetectionConfig {
            confidence_threshold: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn unordered_risk_bands_are_rejected() {
        let config = DetectionConfig {
            low_risk_threshold: 0.95,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
