/*!
# Monitor

Owns the background loop and everything it accumulates: the bounded event
buffer, the alert log, the fault log and the running statistics. All four
live behind one mutex; the loop takes it once per processed event, readers
take it only long enough to clone.

The loop runs on a dedicated, named OS thread hosting a current-thread
tokio runtime, so a monitor can be driven from synchronous code as well as
from inside another runtime.
*/

mod diagnostics;
mod error;
mod settings;
mod state;
mod worker;

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, RecvTimeoutError};
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

use netvakt_core::events::{EventSource, NetworkEvent};
use netvakt_core::time::{Clock, SystemClock};
use netvakt_core::traffic::TrafficMetrics;
use netvakt_detection::{Alert, AlertPipeline, ClassifierAdapter, HeuristicModel, ThreatModel};
use netvakt_telemetry::MetricsRecorder;

pub use self::diagnostics::{Fault, FaultKind};
pub use self::error::MonitorError;
pub use self::settings::MonitorSettings;
pub use self::state::MonitorStatistics;

use self::state::MonitorState;
use self::worker::{Throttle, Worker};

const THREAD_NAME: &str = "netvakt-monitor";

/// How a call to [`Monitor::stop`] ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shutdown {
    /// The loop observed the signal and exited.
    Clean,
    /// There was no loop to stop.
    NotRunning,
    /// The loop did not exit within the grace period and was detached. It
    /// still exits at its next await point, but the monitor no longer tracks
    /// it: [`Monitor::is_running`] reports `false` from here on even while
    /// the detached thread finishes its current source or model call.
    GraceExpired,
}

struct LoopHandle {
    shutdown: watch::Sender<bool>,
    done: Receiver<()>,
    thread: JoinHandle<()>,
}

pub struct Monitor {
    settings: MonitorSettings,
    worker: Arc<Worker>,
    control: Mutex<Option<LoopHandle>>,
}

impl Monitor {
    /// Validates `settings` and wires the collaborators together. The loop is
    /// not started.
    pub fn new(
        settings: MonitorSettings,
        source: Arc<dyn EventSource>,
        model: Arc<dyn ThreatModel>,
        clock: Arc<dyn Clock>,
        metrics: Arc<MetricsRecorder>,
    ) -> Result<Self, MonitorError> {
        settings.validate()?;

        let monitor = &settings.monitor;
        let state = MonitorState::new(
            monitor.buffer_capacity,
            monitor.alert_capacity,
            monitor.fault_capacity,
        )?;
        let pipeline = AlertPipeline::from_config(&settings.detection)?;
        let classifier = ClassifierAdapter::new(
            model,
            settings.detection.feature_width,
            monitor.classify_timeout(),
        );
        let (throttle_min, throttle_max) = monitor.throttle();

        let worker = Worker {
            source,
            classifier,
            pipeline,
            clock,
            metrics,
            state: Arc::new(Mutex::new(state)),
            source_timeout: monitor.source_timeout(),
            throttle: Throttle::new(throttle_min, throttle_max),
        };

        debug!(settings = ?settings, "Monitor created");
        Ok(Self {
            settings,
            worker: Arc::new(worker),
            control: Mutex::new(None),
        })
    }

    pub fn builder(source: Arc<dyn EventSource>) -> MonitorBuilder {
        MonitorBuilder::new(source)
    }

    /// Starts the background loop. Calling it on a running monitor is a no-op.
    #[instrument(skip(self), fields(source = self.worker.source.name()))]
    pub fn start(&self) -> Result<(), MonitorError> {
        let mut control = self.control.lock();
        if let Some(handle) = control.as_ref() {
            if !handle.thread.is_finished() {
                debug!("Monitor already running");
                return Ok(());
            }
        }
        if let Some(stale) = control.take() {
            if stale.thread.join().is_err() {
                error!("Previous monitor loop had panicked");
            }
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (done_tx, done_rx) = channel::bounded(1);
        let worker = Arc::clone(&self.worker);

        let thread = thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || {
                runtime.block_on(worker.run(shutdown_rx));
                // Classifier calls abandoned on timeout must not hold up exit.
                runtime.shutdown_background();
                let _ = done_tx.send(());
            })?;

        *control = Some(LoopHandle {
            shutdown: shutdown_tx,
            done: done_rx,
            thread,
        });
        info!("Monitor started");
        Ok(())
    }

    /// Signals the loop and waits up to the configured grace period for it
    /// to exit. Calling it on a stopped monitor returns
    /// [`Shutdown::NotRunning`].
    #[instrument(skip(self))]
    pub fn stop(&self) -> Shutdown {
        let Some(handle) = self.control.lock().take() else {
            return Shutdown::NotRunning;
        };

        let _ = handle.shutdown.send(true);
        let grace = self.settings.monitor.stop_grace();
        match handle.done.recv_timeout(grace) {
            Ok(()) => {
                if handle.thread.join().is_err() {
                    error!("Monitor loop panicked during shutdown");
                }
                info!("Monitor stopped");
                Shutdown::Clean
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    grace_ms = grace.as_millis() as u64,
                    "Monitor loop did not exit in time; detaching"
                );
                Shutdown::GraceExpired
            }
            Err(RecvTimeoutError::Disconnected) => {
                let _ = handle.thread.join();
                error!("Monitor loop terminated abnormally");
                Shutdown::Clean
            }
        }
    }

    /// Clears the buffer, both logs and the statistics. Running state is
    /// untouched.
    pub fn reset(&self) {
        self.worker.state.lock().reset();
        info!("Monitor state reset");
    }

    /// Whether a tracked loop thread is alive. A loop detached by
    /// [`Shutdown::GraceExpired`] is not tracked.
    pub fn is_running(&self) -> bool {
        self.control
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.thread.is_finished())
    }

    pub fn get_statistics(&self) -> MonitorStatistics {
        self.worker.state.lock().stats
    }

    /// The last `count` buffered events, oldest first.
    pub fn get_recent_events(&self, count: usize) -> Vec<NetworkEvent> {
        self.worker.state.lock().buffer.recent(count)
    }

    /// Up to `count` alerts, most recent first.
    pub fn get_recent_alerts(&self, count: usize) -> Vec<Alert> {
        self.worker.state.lock().alerts.recent(count)
    }

    /// Up to `count` faults, most recent first.
    pub fn get_recent_faults(&self, count: usize) -> Vec<Fault> {
        self.worker.state.lock().faults.recent(count)
    }

    /// Traffic figures over buffered events stamped within `window` of now.
    /// The lock is held only while the windowed events are copied out.
    pub fn get_traffic_metrics(&self, window: Duration) -> TrafficMetrics {
        let now = self.worker.clock.now_ns();
        let events: Vec<NetworkEvent> = {
            let state = self.worker.state.lock();
            state.buffer.window(window, now).cloned().collect()
        };
        TrafficMetrics::from_events(&events, window)
    }

    pub fn get_traffic_metrics_default(&self) -> TrafficMetrics {
        self.get_traffic_metrics(self.settings.monitor.metrics_window())
    }

    pub fn settings(&self) -> &MonitorSettings {
        &self.settings
    }

    pub fn metrics(&self) -> &MetricsRecorder {
        &self.worker.metrics
    }

    pub fn source_name(&self) -> &str {
        self.worker.source.name()
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        if self.control.get_mut().is_some() {
            self.stop();
        }
    }
}

/// Builds a [`Monitor`] around a source, defaulting everything else:
/// default settings, the heuristic model, the system clock and a fresh
/// metrics registry.
pub struct MonitorBuilder {
    source: Arc<dyn EventSource>,
    settings: MonitorSettings,
    model: Option<Arc<dyn ThreatModel>>,
    clock: Option<Arc<dyn Clock>>,
    metrics: Option<Arc<MetricsRecorder>>,
}

impl MonitorBuilder {
    pub fn new(source: Arc<dyn EventSource>) -> Self {
        Self {
            source,
            settings: MonitorSettings::default(),
            model: None,
            clock: None,
            metrics: None,
        }
    }

    pub fn settings(mut self, settings: MonitorSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn model(mut self, model: Arc<dyn ThreatModel>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn metrics(mut self, metrics: Arc<MetricsRecorder>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn build(self) -> Result<Monitor, MonitorError> {
        let metrics = match self.metrics {
            Some(metrics) => metrics,
            None => Arc::new(MetricsRecorder::new()?),
        };
        Monitor::new(
            self.settings,
            self.source,
            self.model
                .unwrap_or_else(|| Arc::new(HeuristicModel::new())),
            self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            metrics,
        )
    }
}
