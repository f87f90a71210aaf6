use std::collections::VecDeque;
use std::fmt;

use serde::Serialize;

use netvakt_core::events::SourceError;
use netvakt_core::time::Timestamp;
use netvakt_detection::ClassificationError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultKind {
    SourceUnavailable,
    SourceTimeout,
    Classification,
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FaultKind::SourceUnavailable => "source_unavailable",
            FaultKind::SourceTimeout => "source_timeout",
            FaultKind::Classification => "classification",
        })
    }
}

/// A transient failure observed by the monitor loop.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Fault {
    pub timestamp: Timestamp,
    pub kind: FaultKind,
    pub detail: String,
}

impl Fault {
    pub fn from_source(timestamp: Timestamp, error: &SourceError) -> Self {
        let kind = match error {
            SourceError::Timeout(_) => FaultKind::SourceTimeout,
            SourceError::Unavailable(_) | SourceError::Exhausted => FaultKind::SourceUnavailable,
        };
        Self {
            timestamp,
            kind,
            detail: error.to_string(),
        }
    }

    pub fn from_classification(timestamp: Timestamp, error: &ClassificationError) -> Self {
        Self {
            timestamp,
            kind: FaultKind::Classification,
            detail: error.to_string(),
        }
    }
}

/// Capped, most-recent-first record of loop faults.
#[derive(Debug)]
pub struct FaultLog {
    faults: VecDeque<Fault>,
    capacity: usize,
}

impl FaultLog {
    /// `capacity` of zero is clamped to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            faults: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, fault: Fault) {
        self.faults.push_front(fault);
        self.faults.truncate(self.capacity);
    }

    pub fn recent(&self, count: usize) -> Vec<Fault> {
        self.faults.iter().take(count).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.faults.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faults.is_empty()
    }

    pub fn clear(&mut self) {
        self.faults.clear();
    }
}
