//! # netvakt Detection Engine
//!
//! Classification of network events against the threat taxonomy and the
//! alerting policy applied to the results.

pub mod alerts;
pub mod classifier;
pub mod heuristic;
pub mod threat;

pub use alerts::{Alert, AlertLog, AlertPipeline, DiscardReason, PipelineError, Verdict};
pub use classifier::{
    normalize_features, ClassificationError, ClassificationResult, ClassifierAdapter, ModelError,
    ThreatModel,
};
pub use heuristic::HeuristicModel;
pub use threat::{RiskBands, RiskLevel, Severity, ThreatCategory};
