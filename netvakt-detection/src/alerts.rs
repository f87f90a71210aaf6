//! ## netvakt-detection::alerts
//! **Threshold policy and the capped, most-recent-first alert log**
//!
//! Per event the pipeline is stateless:
//! - benign label → discarded
//! - non-benign, confidence ≤ threshold → discarded
//! - non-benign, confidence > threshold → alert raised

use std::collections::VecDeque;

use netvakt_config::DetectionConfig;
use netvakt_core::events::NetworkEvent;
use netvakt_core::time::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classifier::ClassificationResult;
use crate::threat::{RiskBands, RiskLevel, Severity, ThreatCategory};

/// A retained record of a confidently classified non-benign event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub timestamp: Timestamp,
    pub threat_type: ThreatCategory,
    pub confidence: f64,
    pub source: String,
    pub destination: String,
    pub severity: Severity,
    pub description: String,
    pub risk: RiskLevel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiscardReason {
    Benign,
    BelowThreshold,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Verdict {
    Discarded(DiscardReason),
    Raised(Alert),
}

impl Verdict {
    pub fn into_alert(self) -> Option<Alert> {
        match self {
            Verdict::Raised(alert) => Some(alert),
            Verdict::Discarded(_) => None,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum PipelineError {
    #[error("Detection threshold {0} is outside [0, 1]")]
    InvalidThreshold(f64),

    #[error("Alert log capacity must be greater than zero")]
    InvalidCapacity,
}

/// Turns classification results into alerts.
#[derive(Clone, Debug)]
pub struct AlertPipeline {
    threshold: f64,
    bands: RiskBands,
}

impl AlertPipeline {
    pub fn new(threshold: f64, bands: RiskBands) -> Result<Self, PipelineError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(PipelineError::InvalidThreshold(threshold));
        }
        Ok(Self { threshold, bands })
    }

    pub fn from_config(config: &DetectionConfig) -> Result<Self, PipelineError> {
        Self::new(
            config.confidence_threshold,
            RiskBands {
                low: config.low_risk_threshold,
                medium: config.medium_risk_threshold,
                high: config.high_risk_threshold,
            },
        )
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn evaluate(&self, event: &NetworkEvent, result: &ClassificationResult) -> Verdict {
        if result.label.is_benign() {
            return Verdict::Discarded(DiscardReason::Benign);
        }
        if result.confidence <= self.threshold {
            return Verdict::Discarded(DiscardReason::BelowThreshold);
        }

        Verdict::Raised(Alert {
            timestamp: event.timestamp,
            threat_type: result.label,
            confidence: result.confidence,
            source: event.source.clone(),
            destination: event.destination.clone(),
            severity: result.label.severity(),
            description: result.label.description().to_string(),
            risk: self.bands.classify(result.confidence),
        })
    }
}

/// Most-recent-first alert log holding at most `capacity` entries.
#[derive(Clone, Debug)]
pub struct AlertLog {
    entries: VecDeque<Alert>,
    capacity: usize,
}

impl AlertLog {
    pub fn with_capacity(capacity: usize) -> Result<Self, PipelineError> {
        if capacity == 0 {
            return Err(PipelineError::InvalidCapacity);
        }
        Ok(Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        })
    }

    /// Inserts at the head, dropping the oldest entry once over capacity.
    pub fn record(&mut self, alert: Alert) {
        self.entries.push_front(alert);
        self.entries.truncate(self.capacity);
    }

    /// Up to `count` alerts, newest first.
    pub fn recent(&self, count: usize) -> Vec<Alert> {
        self.entries.iter().take(count).cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Alert> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn event(stamp: Timestamp) -> NetworkEvent {
        NetworkEvent::builder(stamp, "192.168.1.7", "10.0.0.9:22").build()
    }

    fn result(label: ThreatCategory, confidence: f64) -> ClassificationResult {
        ClassificationResult { label, confidence }
    }

    fn pipeline() -> AlertPipeline {
        AlertPipeline::new(0.7, RiskBands::default()).unwrap()
    }

    #[test]
    fn benign_is_discarded_regardless_of_confidence() {
        let verdict = pipeline().evaluate(&event(1), &result(ThreatCategory::Benign, 0.99));
        assert_eq!(verdict, Verdict::Discarded(DiscardReason::Benign));
    }

    #[test]
    fn threshold_is_exclusive() {
        let verdict = pipeline().evaluate(&event(1), &result(ThreatCategory::Dos, 0.7));
        assert_eq!(verdict, Verdict::Discarded(DiscardReason::BelowThreshold));
        let verdict = pipeline().evaluate(&event(1), &result(ThreatCategory::Dos, 0.3));
        assert_eq!(verdict, Verdict::Discarded(DiscardReason::BelowThreshold));
    }

    #[test]
    fn confident_threat_raises_derived_alert() {
        let alert = pipeline()
            .evaluate(&event(42), &result(ThreatCategory::R2l, 0.92))
            .into_alert()
            .unwrap();

        assert_eq!(alert.timestamp, 42);
        assert_eq!(alert.threat_type, ThreatCategory::R2l);
        assert_eq!(alert.severity, Severity::High);
        assert_eq!(alert.description, "Remote to Local attack detected");
        assert_eq!(alert.source, "192.168.1.7");
        assert_eq!(alert.destination, "10.0.0.9:22");
        assert_eq!(alert.risk, RiskLevel::High);
    }

    #[test]
    fn unknown_falls_back_to_medium() {
        let alert = pipeline()
            .evaluate(&event(1), &result(ThreatCategory::Unknown, 0.75))
            .into_alert()
            .unwrap();
        assert_eq!(alert.severity, Severity::Medium);
        assert_eq!(alert.risk, RiskLevel::Medium);
    }

    #[test]
    fn rejects_bad_threshold_and_capacity() {
        assert_eq!(
            AlertPipeline::new(1.5, RiskBands::default()).unwrap_err(),
            PipelineError::InvalidThreshold(1.5)
        );
        assert_eq!(
            AlertLog::with_capacity(0).unwrap_err(),
            PipelineError::InvalidCapacity
        );
    }

    #[test]
    fn log_is_newest_first() {
        let mut log = AlertLog::with_capacity(10).unwrap();
        for stamp in 1..=3 {
            let alert = pipeline()
                .evaluate(&event(stamp), &result(ThreatCategory::Probe, 0.8))
                .into_alert()
                .unwrap();
            log.record(alert);
        }
        let stamps: Vec<_> = log.recent(2).iter().map(|a| a.timestamp).collect();
        assert_eq!(stamps, [3, 2]);
    }

    proptest! {
        #[test]
        fn log_never_exceeds_cap_and_drops_oldest(cap in 1usize..32, raised in 0u64..128) {
            let mut log = AlertLog::with_capacity(cap).unwrap();
            let pipeline = pipeline();
            for stamp in 0..raised {
                if let Verdict::Raised(alert) = pipeline.evaluate(&event(stamp), &result(ThreatCategory::Dos, 0.9)) {
                    log.record(alert);
                }
                prop_assert!(log.len() <= cap);
            }

            let kept: Vec<u64> = log.iter().map(|a| a.timestamp).collect();
            let expected: Vec<u64> = (raised.saturating_sub(cap as u64)..raised).rev().collect();
            prop_assert_eq!(kept, expected);
        }
    }
}
