//! # netvakt Telemetry
//!
//! Logging subscriber setup, security-event spans and the Prometheus
//! recorder shared by the monitor loop.

pub mod logging;
pub mod metrics;

pub use logging::EventLogger;
pub use metrics::MetricsRecorder;
