//! Monitor orchestration parameters.
//!
//! Sizes of the retained logs, the jittered pause between iterations and the
//! timeouts that bound every collaborator call.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::{self, Validate, ValidationError};

/// Monitoring loop configuration.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
#[validate(schema(function = "validate_throttle"))]
pub struct MonitorConfig {
    /// Events retained for windowed metrics.
    #[validate(range(min = 1, max = 1_000_000))]
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,

    /// Alerts retained, most recent first.
    #[validate(range(min = 1, max = 100_000))]
    #[serde(default = "default_alert_capacity")]
    pub alert_capacity: usize,

    /// Diagnostic faults retained, most recent first.
    #[validate(range(min = 1, max = 10_000))]
    #[serde(default = "default_fault_capacity")]
    pub fault_capacity: usize,

    /// Lower bound of the pause between iterations (milliseconds).
    #[serde(default = "default_throttle_min_ms")]
    pub throttle_min_ms: u64,

    /// Upper bound of the pause between iterations (milliseconds).
    #[validate(range(min = 1, max = 60_000))]
    #[serde(default = "default_throttle_max_ms")]
    pub throttle_max_ms: u64,

    /// Bound on a single event source call (milliseconds).
    #[validate(range(min = 1, max = 60_000))]
    #[serde(default = "default_call_timeout_ms")]
    pub source_timeout_ms: u64,

    /// Bound on a single classifier call (milliseconds).
    #[validate(range(min = 1, max = 60_000))]
    #[serde(default = "default_call_timeout_ms")]
    pub classify_timeout_ms: u64,

    /// How long `stop()` waits for the loop to exit (milliseconds).
    #[validate(range(min = 1, max = 600_000))]
    #[serde(default = "default_stop_grace_ms")]
    pub stop_grace_ms: u64,

    /// Default window for traffic metrics (seconds).
    #[validate(range(min = 1, max = 86_400))]
    #[serde(default = "default_metrics_window_secs")]
    pub metrics_window_secs: u64,
}

fn default_buffer_capacity() -> usize {
    1000
}
fn default_alert_capacity() -> usize {
    100
}
fn default_fault_capacity() -> usize {
    50
}
fn default_throttle_min_ms() -> u64 {
    100
}
fn default_throttle_max_ms() -> u64 {
    500
}
fn default_call_timeout_ms() -> u64 {
    1000
}
fn default_stop_grace_ms() -> u64 {
    5000
}
fn default_metrics_window_secs() -> u64 {
    60
}

fn validate_throttle(config: &MonitorConfig) -> Result<(), ValidationError> {
    if config.throttle_min_ms > config.throttle_max_ms {
        return Err(ValidationError::new("throttle_min_exceeds_max"));
    }
    Ok(())
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: default_buffer_capacity(),
            alert_capacity: default_alert_capacity(),
            fault_capacity: default_fault_capacity(),
            throttle_min_ms: default_throttle_min_ms(),
            throttle_max_ms: default_throttle_max_ms(),
            source_timeout_ms: default_call_timeout_ms(),
            classify_timeout_ms: default_call_timeout_ms(),
            stop_grace_ms: default_stop_grace_ms(),
            metrics_window_secs: default_metrics_window_secs(),
        }
    }
}

impl MonitorConfig {
    pub fn throttle(&self) -> (Duration, Duration) {
        (
            Duration::from_millis(self.throttle_min_ms),
            Duration::from_millis(self.throttle_max_ms),
        )
    }

    pub fn source_timeout(&self) -> Duration {
        Duration::from_millis(self.source_timeout_ms)
    }

    pub fn classify_timeout(&self) -> Duration {
        Duration::from_millis(self.classify_timeout_ms)
    }

    pub fn stop_grace(&self) -> Duration {
        Duration::from_millis(self.stop_grace_ms)
    }

    pub fn metrics_window(&self) -> Duration {
        Duration::from_secs(self.metrics_window_secs)
    }
}
