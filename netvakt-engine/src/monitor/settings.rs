use std::time::Duration;

use validator::Validate;

use netvakt_config::{DetectionConfig, MonitorConfig, NetvaktConfig};

use super::error::MonitorError;

/// The slice of configuration a monitor runs with.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MonitorSettings {
    pub monitor: MonitorConfig,
    pub detection: DetectionConfig,
}

impl MonitorSettings {
    pub fn new(monitor: MonitorConfig, detection: DetectionConfig) -> Self {
        Self { monitor, detection }
    }

    /// Overrides the pause bounds between iterations.
    pub fn with_throttle(mut self, min: Duration, max: Duration) -> Self {
        self.monitor.throttle_min_ms = min.as_millis() as u64;
        self.monitor.throttle_max_ms = max.as_millis() as u64;
        self
    }

    /// Zero capacities map to [`MonitorError::InvalidCapacity`]; any other
    /// rule violation to [`MonitorError::InvalidSettings`].
    pub fn validate(&self) -> Result<(), MonitorError> {
        let monitor = &self.monitor;
        if monitor.buffer_capacity == 0 || monitor.alert_capacity == 0 || monitor.fault_capacity == 0
        {
            return Err(MonitorError::InvalidCapacity);
        }
        monitor
            .validate()
            .map_err(|e| MonitorError::InvalidSettings(e.to_string()))?;
        self.detection
            .validate()
            .map_err(|e| MonitorError::InvalidSettings(e.to_string()))?;
        Ok(())
    }
}

impl From<&NetvaktConfig> for MonitorSettings {
    fn from(config: &NetvaktConfig) -> Self {
        Self::new(config.monitor.clone(), config.detection.clone())
    }
}
