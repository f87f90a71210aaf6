use thiserror::Error;

use netvakt_core::buffer::BufferError;
use netvakt_detection::PipelineError;

/// Errors that prevent a monitor from being built or started. Per-iteration
/// faults never surface here; they land in the fault log.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Capacity must be greater than zero")]
    InvalidCapacity,

    #[error("Invalid monitor settings: {0}")]
    InvalidSettings(String),

    #[error("Failed to spawn monitor thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Metrics registry error: {0}")]
    Telemetry(#[from] prometheus::Error),
}

impl From<BufferError> for MonitorError {
    fn from(_: BufferError) -> Self {
        MonitorError::InvalidCapacity
    }
}

impl From<PipelineError> for MonitorError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::InvalidCapacity => MonitorError::InvalidCapacity,
            PipelineError::InvalidThreshold(_) => MonitorError::InvalidSettings(err.to_string()),
        }
    }
}
