//! The background loop: pull, classify, alert, record, pause.

use std::sync::Arc;
use std::time::{Duration, Instant};

use opentelemetry::KeyValue;
use parking_lot::Mutex;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use netvakt_core::events::{EventSource, NetworkEvent, SourceError};
use netvakt_core::time::Clock;
use netvakt_detection::{Alert, AlertPipeline, ClassifierAdapter, Verdict};
use netvakt_telemetry::{EventLogger, MetricsRecorder};

use super::diagnostics::{Fault, FaultKind};
use super::state::MonitorState;

/// What a single iteration did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Iteration {
    /// The source had nothing to offer.
    Idle,
    SourceFault(FaultKind),
    ClassificationFailed,
    Processed { alerted: bool },
}

/// Jittered pause drawn uniformly from `[min, max]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Throttle {
    min: Duration,
    max: Duration,
}

impl Throttle {
    pub(crate) fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    pub(crate) fn pause<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        let micros = rng.random_range(self.min.as_micros() as u64..=self.max.as_micros() as u64);
        Duration::from_micros(micros)
    }
}

pub(crate) struct Worker {
    pub(crate) source: Arc<dyn EventSource>,
    pub(crate) classifier: ClassifierAdapter,
    pub(crate) pipeline: AlertPipeline,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) metrics: Arc<MetricsRecorder>,
    pub(crate) state: Arc<Mutex<MonitorState>>,
    pub(crate) source_timeout: Duration,
    pub(crate) throttle: Throttle,
}

impl Worker {
    /// Runs until `shutdown` flips or its sender goes away. The signal
    /// interrupts the wait on the source and the pause; an event already
    /// pulled is always classified and recorded before the loop exits.
    pub(crate) async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let mut rng = SmallRng::from_os_rng();
        let mut iterations: u64 = 0;
        info!(source = self.source.name(), "Monitor loop started");

        loop {
            let pulled = tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                pulled = self.next_event() => pulled,
            };
            self.handle(pulled).await;
            iterations += 1;

            tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                _ = tokio::time::sleep(self.throttle.pause(&mut rng)) => {}
            }
        }

        info!(iterations, "Monitor loop stopped");
    }

    #[cfg(test)]
    pub(crate) async fn process_once(&self) -> Iteration {
        let pulled = self.next_event().await;
        self.handle(pulled).await
    }

    #[instrument(skip_all, level = "trace")]
    async fn handle(&self, pulled: Result<NetworkEvent, SourceError>) -> Iteration {
        let event = match pulled {
            Ok(event) => event,
            Err(SourceError::Exhausted) => {
                debug!(source = self.source.name(), "Event source exhausted");
                return Iteration::Idle;
            }
            Err(error) => {
                warn!(source = self.source.name(), %error, "Skipping iteration");
                let fault = Fault::from_source(self.clock.now_ns(), &error);
                let kind = fault.kind;
                self.state.lock().record_fault(fault);
                self.metrics.inc_source_faults();
                return Iteration::SourceFault(kind);
            }
        };

        let started = Instant::now();
        let classified = self.classifier.classify(&event.features).await;
        self.metrics.observe_classification(started.elapsed());

        let outcome = classified.map(|result| self.pipeline.evaluate(&event, &result));
        let raised = match &outcome {
            Ok(Verdict::Raised(alert)) => Some(alert.clone()),
            _ => None,
        };
        let failure = outcome.as_ref().err().cloned();

        let now = self.clock.now_ns();
        self.state.lock().apply(event, outcome, now);
        self.metrics.inc_processed_events();

        if let Some(error) = failure {
            warn!(%error, "Classification failed; event kept without a verdict");
            self.metrics.inc_classification_failures();
            return Iteration::ClassificationFailed;
        }

        match raised {
            Some(alert) => {
                self.metrics.inc_threats();
                report(&alert).await;
                Iteration::Processed { alerted: true }
            }
            None => Iteration::Processed { alerted: false },
        }
    }

    async fn next_event(&self) -> Result<NetworkEvent, SourceError> {
        match tokio::time::timeout(self.source_timeout, self.source.next_event()).await {
            Ok(result) => result,
            Err(_) => Err(SourceError::Timeout(self.source_timeout)),
        }
    }
}

async fn report(alert: &Alert) {
    warn!(
        threat = %alert.threat_type,
        severity = %alert.severity,
        confidence = alert.confidence,
        source = %alert.source,
        destination = %alert.destination,
        "Threat detected"
    );
    EventLogger::log_event(
        "threat_alert",
        vec![
            KeyValue::new("threat_type", alert.threat_type.as_str()),
            KeyValue::new("severity", alert.severity.as_str()),
            KeyValue::new("confidence", alert.confidence),
            KeyValue::new("risk", alert.risk.to_string()),
            KeyValue::new("source", alert.source.clone()),
            KeyValue::new("destination", alert.destination.clone()),
        ],
    )
    .await;
}
