mod common;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use netvakt_core::events::{EventSource, NetworkEvent, SourceError};
use netvakt_detection::{ModelError, Severity, ThreatCategory, ThreatModel};
use netvakt_engine::{FaultKind, Monitor, MonitorStatistics, Shutdown};
use netvakt_simulator::ScriptedSource;

use common::{event, fast_settings, system_clock, wait_until, Script, ScriptedModel, CLASSES};

fn scripted_monitor(events: Vec<NetworkEvent>) -> Monitor {
    let source = ScriptedSource::new(events).restamped_by(system_clock());
    Monitor::builder(Arc::new(source))
        .settings(fast_settings())
        .model(Arc::new(ScriptedModel))
        .build()
        .unwrap()
}

#[test]
fn scripted_run_raises_one_critical_dos_alert() {
    let monitor = scripted_monitor(vec![
        event(Script::Benign, 1),
        event(Script::Benign, 2),
        event(Script::Dos, 3),
        event(Script::Benign, 4),
        event(Script::Benign, 5),
    ]);

    monitor.start().unwrap();
    assert!(wait_until(|| monitor.get_statistics().total_events == 5));
    assert_eq!(monitor.stop(), Shutdown::Clean);

    let stats = monitor.get_statistics();
    assert_eq!(stats.total_events, 5);
    assert_eq!(stats.threats_detected, 1);
    assert_eq!(stats.classification_failures, 0);
    assert!(stats.last_update.is_some());

    let alerts = monitor.get_recent_alerts(10);
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].threat_type, ThreatCategory::Dos);
    assert_eq!(alerts[0].severity, Severity::Critical);
    assert_eq!(alerts[0].source, "192.168.1.3");

    let events = monitor.get_recent_events(2);
    let sources: Vec<_> = events.iter().map(|e| e.source.as_str()).collect();
    assert_eq!(sources, ["192.168.1.4", "192.168.1.5"]);

    let traffic = monitor.get_traffic_metrics_default();
    assert_eq!(traffic.event_count, 5);
    assert_eq!(traffic.unique_sources, 5);
    assert_eq!(traffic.unique_destinations, 1);
}

#[test]
fn benign_and_weak_verdicts_raise_nothing() {
    let monitor = scripted_monitor(vec![
        event(Script::Benign, 1),
        event(Script::WeakProbe, 2),
        event(Script::WeakProbe, 3),
    ]);

    monitor.start().unwrap();
    assert!(wait_until(|| monitor.get_statistics().total_events == 3));
    monitor.stop();

    assert_eq!(monitor.get_statistics().threats_detected, 0);
    assert!(monitor.get_recent_alerts(10).is_empty());
}

#[test]
fn reset_clears_state_but_keeps_running() {
    let monitor = scripted_monitor(vec![
        event(Script::Dos, 1),
        event(Script::Benign, 2),
        event(Script::Dos, 3),
    ]);

    monitor.start().unwrap();
    assert!(wait_until(|| monitor.get_statistics().total_events == 3));

    monitor.reset();
    assert!(monitor.is_running());
    assert_eq!(monitor.get_statistics(), MonitorStatistics::default());
    assert!(monitor.get_recent_events(10).is_empty());
    assert!(monitor.get_recent_alerts(10).is_empty());

    assert_eq!(monitor.stop(), Shutdown::Clean);
    monitor.reset();
    assert_eq!(monitor.get_statistics(), MonitorStatistics::default());
}

#[test]
fn classification_failure_counts_the_event() {
    let monitor = scripted_monitor(vec![event(Script::Fail, 1), event(Script::Dos, 2)]);

    monitor.start().unwrap();
    assert!(wait_until(|| monitor.get_statistics().total_events == 2));
    monitor.stop();

    let stats = monitor.get_statistics();
    assert_eq!(stats.classification_failures, 1);
    assert_eq!(stats.threats_detected, 1);

    let faults = monitor.get_recent_faults(10);
    assert_eq!(faults.len(), 1);
    assert_eq!(faults[0].kind, FaultKind::Classification);
    assert_eq!(monitor.get_recent_events(10).len(), 2);
}

/// Never answers within any reasonable timeout.
struct Sluggish;

#[async_trait]
impl EventSource for Sluggish {
    async fn next_event(&self) -> Result<NetworkEvent, SourceError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Err(SourceError::Exhausted)
    }

    fn name(&self) -> &str {
        "sluggish"
    }
}

#[test]
fn source_timeouts_are_faults_not_events() {
    let mut settings = fast_settings();
    settings.monitor.source_timeout_ms = 20;
    let monitor = Monitor::builder(Arc::new(Sluggish))
        .settings(settings)
        .model(Arc::new(ScriptedModel))
        .build()
        .unwrap();

    monitor.start().unwrap();
    assert!(wait_until(|| monitor.get_recent_faults(1).len() == 1));
    // Shutdown interrupts the pending source call.
    assert_eq!(monitor.stop(), Shutdown::Clean);

    assert_eq!(monitor.get_statistics().total_events, 0);
    assert_eq!(monitor.get_recent_faults(1)[0].kind, FaultKind::SourceTimeout);
    assert!(monitor.metrics().source_faults.get() >= 1.0);
}

/// Answers like [`ScriptedModel`], but only after a pause.
struct Deliberate(Duration);

impl ThreatModel for Deliberate {
    fn classes(&self) -> &[ThreatCategory] {
        &CLASSES
    }

    fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>, ModelError> {
        std::thread::sleep(self.0);
        ScriptedModel.predict_proba(row)
    }
}

#[test]
fn stop_finishes_the_event_already_pulled() {
    let source =
        Arc::new(ScriptedSource::new(vec![event(Script::Dos, 1)]).restamped_by(system_clock()));
    let mut settings = fast_settings();
    settings.monitor.classify_timeout_ms = 1_000;
    let monitor = Monitor::builder(source.clone())
        .settings(settings)
        .model(Arc::new(Deliberate(Duration::from_millis(150))))
        .build()
        .unwrap();

    monitor.start().unwrap();
    assert!(wait_until(|| source.remaining() == 0));
    assert_eq!(monitor.stop(), Shutdown::Clean);

    let stats = monitor.get_statistics();
    assert_eq!(stats.total_events, 1);
    assert_eq!(stats.threats_detected, 1);
    assert_eq!(monitor.get_recent_events(10).len(), 1);
}

/// Blocks its runtime thread outright, so the loop cannot observe shutdown.
struct Wedged;

#[async_trait]
impl EventSource for Wedged {
    async fn next_event(&self) -> Result<NetworkEvent, SourceError> {
        std::thread::sleep(Duration::from_millis(400));
        Err(SourceError::Exhausted)
    }

    fn name(&self) -> &str {
        "wedged"
    }
}

#[test]
fn stop_reports_expired_grace() {
    let mut settings = fast_settings();
    settings.monitor.stop_grace_ms = 20;
    let monitor = Monitor::builder(Arc::new(Wedged))
        .settings(settings)
        .build()
        .unwrap();

    monitor.start().unwrap();
    std::thread::sleep(Duration::from_millis(20));
    assert_eq!(monitor.stop(), Shutdown::GraceExpired);
    assert!(!monitor.is_running());
    assert_eq!(monitor.stop(), Shutdown::NotRunning);
}

struct Counting(Arc<AtomicU64>);

#[async_trait]
impl EventSource for Counting {
    async fn next_event(&self) -> Result<NetworkEvent, SourceError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Err(SourceError::Exhausted)
    }

    fn name(&self) -> &str {
        "counting"
    }
}

#[test]
fn dropping_a_running_monitor_stops_the_loop() {
    let calls = Arc::new(AtomicU64::new(0));
    let monitor = Monitor::builder(Arc::new(Counting(Arc::clone(&calls))))
        .settings(fast_settings())
        .build()
        .unwrap();

    monitor.start().unwrap();
    assert!(wait_until(|| calls.load(Ordering::SeqCst) > 3));
    drop(monitor);

    let settled = calls.load(Ordering::SeqCst);
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(calls.load(Ordering::SeqCst), settled);
}

#[tokio::test]
async fn lifecycle_works_from_inside_a_runtime() {
    let monitor = scripted_monitor(vec![event(Script::Benign, 1)]);
    monitor.start().unwrap();
    assert!(monitor.is_running());
    tokio::task::yield_now().await;
    assert!(wait_until(|| monitor.get_statistics().total_events == 1));
    assert_eq!(monitor.stop(), Shutdown::Clean);
    assert_eq!(monitor.get_statistics().total_events, 1);
}
