//! ## netvakt-detection::classifier
//! **Adapter between feature vectors and an external threat model**
//!
//! The model only ever sees a fixed-width row of `f64`. The adapter owns the
//! width: shorter vectors are zero-filled, longer ones are truncated to the
//! first `width` values in schema order. Deployed models expect exactly that
//! row layout.

use std::sync::Arc;
use std::time::{Duration, Instant};

use netvakt_core::events::FeatureVector;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, instrument, trace};

use crate::threat::ThreatCategory;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("Model unavailable: {0}")]
    Unavailable(String),

    #[error("Inference failed: {0}")]
    Inference(String),
}

/// Inference contract of an external classifier.
///
/// `predict_proba` returns one probability per entry of `classes()`, in the
/// same order.
pub trait ThreatModel: Send + Sync {
    fn classes(&self) -> &[ThreatCategory];

    fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>, ModelError>;
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ClassificationError {
    #[error("Classifier unavailable: {0}")]
    Unavailable(String),

    #[error("Classifier did not answer within {0:?}")]
    Timeout(Duration),

    #[error("Classifier returned {actual} scores for {expected} classes")]
    ArityMismatch { expected: usize, actual: usize },

    #[error("Classifier returned a non-finite score")]
    NonFinite,

    #[error("Classifier score {0} is outside [0, 1]")]
    OutOfRange(f64),

    #[error("Classifier returned no scores")]
    Empty,
}

/// Label and confidence of one classified event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClassificationResult {
    pub label: ThreatCategory,
    pub confidence: f64,
}

/// Pads with zeros or truncates `features` to exactly `width` values.
pub fn normalize_features(features: &FeatureVector, width: usize) -> Vec<f64> {
    let mut row: Vec<f64> = features.values().take(width).collect();
    row.resize(width, 0.0);
    row
}

/// Reads a model's score vector: the highest score wins, ties go to the
/// earlier class.
pub fn interpret_scores(
    classes: &[ThreatCategory],
    scores: &[f64],
) -> Result<ClassificationResult, ClassificationError> {
    if scores.is_empty() {
        return Err(ClassificationError::Empty);
    }
    if scores.len() != classes.len() {
        return Err(ClassificationError::ArityMismatch {
            expected: classes.len(),
            actual: scores.len(),
        });
    }

    let mut best = 0;
    for (index, &score) in scores.iter().enumerate() {
        if !score.is_finite() {
            return Err(ClassificationError::NonFinite);
        }
        if !(0.0..=1.0).contains(&score) {
            return Err(ClassificationError::OutOfRange(score));
        }
        if score > scores[best] {
            best = index;
        }
    }

    Ok(ClassificationResult {
        label: classes[best],
        confidence: scores[best],
    })
}

/// Runs a [`ThreatModel`] on the blocking pool under a timeout.
///
/// At most one model invocation is in flight per adapter (clones share the
/// slot), so a hung model pins a single blocking thread.
#[derive(Clone)]
pub struct ClassifierAdapter {
    model: Arc<dyn ThreatModel>,
    width: usize,
    timeout: Duration,
    slot: Arc<Semaphore>,
}

impl ClassifierAdapter {
    pub fn new(model: Arc<dyn ThreatModel>, width: usize, timeout: Duration) -> Self {
        Self {
            model,
            width,
            timeout,
            slot: Arc::new(Semaphore::new(1)),
        }
    }

    pub fn feature_width(&self) -> usize {
        self.width
    }

    /// Classifies one feature vector.
    ///
    /// Must be called from within a tokio runtime. A call that outlives the
    /// timeout is reported as [`ClassificationError::Timeout`]; the model
    /// invocation itself is left to finish on the blocking pool and keeps
    /// the slot until it does. Calls made meanwhile fail at once with
    /// [`ClassificationError::Unavailable`].
    #[instrument(skip_all, level = "trace", fields(features = features.len()))]
    pub async fn classify(
        &self,
        features: &FeatureVector,
    ) -> Result<ClassificationResult, ClassificationError> {
        let permit = match Arc::clone(&self.slot).try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                debug!("Previous model call still running");
                return Err(ClassificationError::Unavailable(
                    "previous model call still running".into(),
                ));
            }
        };

        let row = normalize_features(features, self.width);
        let model = Arc::clone(&self.model);
        let started = Instant::now();

        let task = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            model.predict_proba(&row)
        });
        let scores = match tokio::time::timeout(self.timeout, task).await {
            Err(_) => return Err(ClassificationError::Timeout(self.timeout)),
            Ok(Err(join_error)) => {
                return Err(ClassificationError::Unavailable(format!(
                    "model task failed: {join_error}"
                )))
            }
            Ok(Ok(Err(model_error))) => {
                return Err(ClassificationError::Unavailable(model_error.to_string()))
            }
            Ok(Ok(Ok(scores))) => scores,
        };

        let result = interpret_scores(self.model.classes(), &scores)?;
        trace!(
            label = %result.label,
            confidence = result.confidence,
            elapsed_us = started.elapsed().as_micros() as u64,
            "Event classified"
        );
        Ok(result)
    }
}
