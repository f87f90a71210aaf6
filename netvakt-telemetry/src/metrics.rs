//! ## netvakt-telemetry::metrics
//! **Prometheus counters and histograms for the monitor loop**

use std::time::Duration;

use prometheus::{Counter, Encoder, Histogram, HistogramOpts, Registry, TextEncoder};

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: Registry,
    pub processed_events: Counter,
    pub threats_detected: Counter,
    pub classification_failures: Counter,
    pub source_faults: Counter,
    pub classification_latency: Histogram,
}

impl MetricsRecorder {
    /// Builds a recorder with its own registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let processed_events =
            Counter::new("netvakt_events_total", "Total processed network events")?;
        let threats_detected =
            Counter::new("netvakt_threats_total", "Alerts raised by the pipeline")?;
        let classification_failures = Counter::new(
            "netvakt_classification_failures_total",
            "Events whose classification failed or timed out",
        )?;
        let source_faults = Counter::new(
            "netvakt_source_faults_total",
            "Skipped iterations caused by the event source",
        )?;
        let classification_latency = Histogram::with_opts(
            HistogramOpts::new(
                "netvakt_classification_latency_seconds",
                "Classifier adapter round-trip time",
            )
            .buckets(vec![0.0001, 0.001, 0.01, 0.1, 1.0]),
        )?;

        registry.register(Box::new(processed_events.clone()))?;
        registry.register(Box::new(threats_detected.clone()))?;
        registry.register(Box::new(classification_failures.clone()))?;
        registry.register(Box::new(source_faults.clone()))?;
        registry.register(Box::new(classification_latency.clone()))?;

        Ok(Self {
            registry,
            processed_events,
            threats_detected,
            classification_failures,
            source_faults,
            classification_latency,
        })
    }

    /// Text exposition of every registered metric.
    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    pub fn inc_processed_events(&self) {
        self.processed_events.inc();
    }

    pub fn inc_threats(&self) {
        self.threats_detected.inc();
    }

    pub fn inc_classification_failures(&self) {
        self.classification_failures.inc();
    }

    pub fn inc_source_faults(&self) {
        self.source_faults.inc();
    }

    pub fn observe_classification(&self, elapsed: Duration) {
        self.classification_latency.observe(elapsed.as_secs_f64());
    }
}
