//! # netvakt Engine
//!
//! The monitor orchestrator: a background loop that pulls events from a
//! source, classifies them, raises alerts and keeps rolling state for
//! concurrent readers.

pub mod monitor;

pub use monitor::{
    Fault, FaultKind, Monitor, MonitorBuilder, MonitorError, MonitorSettings, MonitorStatistics,
    Shutdown,
};

pub mod prelude {
    pub use super::monitor::*;
}
