//! Recorded traffic scenarios.
//!
//! A scenario is a YAML document holding the generator seed, the recording
//! time and the captured events, sealed with a BLAKE3 checksum over the event
//! list. Loading verifies the checksum before anything is replayed.

use std::fs;
use std::path::Path;

use blake3::Hasher;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use netvakt_core::events::NetworkEvent;
use netvakt_core::time::Timestamp;

use crate::synthetic::SyntheticSource;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("Scenario I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scenario is not valid YAML: {0}")]
    Format(#[from] serde_yaml::Error),

    #[error("Scenario checksum mismatch (recorded {expected}, computed {actual})")]
    ChecksumMismatch { expected: String, actual: String },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub seed: u64,
    pub recorded_at: Timestamp,
    pub checksum: String,
    pub events: Vec<NetworkEvent>,
}

impl Scenario {
    pub fn new(seed: u64, recorded_at: Timestamp, events: Vec<NetworkEvent>) -> Self {
        let checksum = checksum(&events);
        Self {
            seed,
            recorded_at,
            checksum,
            events,
        }
    }

    /// Captures `count` events from a synthetic source. Injected faults are
    /// not recorded.
    pub fn record(source: &SyntheticSource, count: usize) -> Self {
        let recorded_at = source.now();
        let events = (0..count).map(|_| source.generate()).collect();
        Self::new(source.seed(), recorded_at, events)
    }

    pub fn verify(&self) -> Result<(), ScenarioError> {
        let actual = checksum(&self.events);
        if actual != self.checksum {
            return Err(ScenarioError::ChecksumMismatch {
                expected: self.checksum.clone(),
                actual,
            });
        }
        Ok(())
    }

    pub fn from_yaml(text: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = serde_yaml::from_str(text)?;
        scenario.verify()?;
        Ok(scenario)
    }

    pub fn to_yaml(&self) -> Result<String, ScenarioError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        Self::from_yaml(&fs::read_to_string(path)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ScenarioError> {
        fs::write(path, self.to_yaml()?)?;
        Ok(())
    }
}

/// Hex-encoded BLAKE3 digest over the events' field values.
pub fn checksum(events: &[NetworkEvent]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(&(events.len() as u64).to_le_bytes());
    for event in events {
        hash_event(&mut hasher, event);
    }
    hex::encode(hasher.finalize().as_bytes())
}

fn hash_event(hasher: &mut Hasher, event: &NetworkEvent) {
    hasher.update(&event.timestamp.to_le_bytes());
    hash_str(hasher, &event.source);
    hash_str(hasher, &event.destination);
    hash_str(hasher, event.protocol.as_str());
    hasher.update(&event.bytes_sent.to_le_bytes());
    hasher.update(&event.bytes_received.to_le_bytes());
    hasher.update(&event.duration.to_bits().to_le_bytes());
    hash_str(hasher, event.flag.as_str());
    hasher.update(&event.packet_count.to_le_bytes());
    hasher.update(&(event.features.len() as u64).to_le_bytes());
    for (name, value) in event.features.iter() {
        hash_str(hasher, name);
        hasher.update(&value.to_bits().to_le_bytes());
    }
}

fn hash_str(hasher: &mut Hasher, value: &str) {
    hasher.update(&(value.len() as u64).to_le_bytes());
    hasher.update(value.as_bytes());
}
