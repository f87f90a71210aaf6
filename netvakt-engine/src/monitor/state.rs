//! Everything the monitor loop mutates, kept behind a single lock.

use serde::Serialize;

use netvakt_core::buffer::EventBuffer;
use netvakt_core::events::NetworkEvent;
use netvakt_core::time::Timestamp;
use netvakt_detection::{AlertLog, ClassificationError, Verdict};

use super::diagnostics::{Fault, FaultLog};
use super::error::MonitorError;

/// Running totals since construction or the last reset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MonitorStatistics {
    pub total_events: u64,
    pub threats_detected: u64,
    pub classification_failures: u64,
    pub last_update: Option<Timestamp>,
}

#[derive(Debug)]
pub(crate) struct MonitorState {
    pub(crate) buffer: EventBuffer,
    pub(crate) alerts: AlertLog,
    pub(crate) faults: FaultLog,
    pub(crate) stats: MonitorStatistics,
}

impl MonitorState {
    pub(crate) fn new(
        buffer_capacity: usize,
        alert_capacity: usize,
        fault_capacity: usize,
    ) -> Result<Self, MonitorError> {
        if fault_capacity == 0 {
            return Err(MonitorError::InvalidCapacity);
        }
        Ok(Self {
            buffer: EventBuffer::with_capacity(buffer_capacity)?,
            alerts: AlertLog::with_capacity(alert_capacity)?,
            faults: FaultLog::with_capacity(fault_capacity),
            stats: MonitorStatistics::default(),
        })
    }

    /// Folds one processed event into the state.
    ///
    /// The event is buffered and counted whether or not classification
    /// succeeded. Returns true when an alert was recorded.
    pub(crate) fn apply(
        &mut self,
        event: NetworkEvent,
        outcome: Result<Verdict, ClassificationError>,
        now: Timestamp,
    ) -> bool {
        let raised = match outcome {
            Ok(Verdict::Raised(alert)) => {
                self.alerts.record(alert);
                self.stats.threats_detected += 1;
                true
            }
            Ok(Verdict::Discarded(_)) => false,
            Err(error) => {
                self.stats.classification_failures += 1;
                self.faults.record(Fault::from_classification(now, &error));
                false
            }
        };

        self.buffer.push(event);
        self.stats.total_events += 1;
        self.stats.last_update = Some(now);
        raised
    }

    pub(crate) fn record_fault(&mut self, fault: Fault) {
        self.faults.record(fault);
    }

    pub(crate) fn reset(&mut self) {
        self.buffer.clear();
        self.alerts.clear();
        self.faults.clear();
        self.stats = MonitorStatistics::default();
    }
}
