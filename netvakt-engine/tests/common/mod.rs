#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use netvakt_core::events::{FeatureVector, NetworkEvent, Protocol};
use netvakt_core::time::{Clock, SystemClock};
use netvakt_detection::{ModelError, ThreatCategory, ThreatModel};
use netvakt_engine::MonitorSettings;

pub const CLASSES: [ThreatCategory; 3] = [
    ThreatCategory::Benign,
    ThreatCategory::Dos,
    ThreatCategory::Probe,
];

/// What the scripted model answers for an event, keyed by its first feature.
#[derive(Clone, Copy, Debug)]
pub enum Script {
    Benign = 0,
    Dos = 1,
    WeakProbe = 2,
    Fail = 3,
}

/// Answers according to the [`Script`] code carried in the first feature.
pub struct ScriptedModel;

impl ThreatModel for ScriptedModel {
    fn classes(&self) -> &[ThreatCategory] {
        &CLASSES
    }

    fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>, ModelError> {
        match row.first().copied().unwrap_or_default() as u8 {
            0 => Ok(vec![0.95, 0.03, 0.02]),
            1 => Ok(vec![0.05, 0.9, 0.05]),
            2 => Ok(vec![0.2, 0.2, 0.6]),
            _ => Err(ModelError::Inference("scripted failure".into())),
        }
    }
}

pub fn event(script: Script, index: u8) -> NetworkEvent {
    let mut features = FeatureVector::new();
    features.insert("script", script as u8 as f64);
    features.insert("count", f64::from(index));
    NetworkEvent::builder(
        SystemClock.now_ns(),
        format!("192.168.1.{index}"),
        "10.0.0.5:443",
    )
    .protocol(Protocol::Tcp)
    .bytes(1_000, 2_000)
    .duration(0.5)
    .features(features)
    .build()
}

pub fn fast_settings() -> MonitorSettings {
    let mut settings = MonitorSettings::default()
        .with_throttle(Duration::ZERO, Duration::from_millis(1));
    settings.monitor.source_timeout_ms = 200;
    settings.monitor.classify_timeout_ms = 200;
    settings.monitor.stop_grace_ms = 2_000;
    settings
}

pub fn system_clock() -> Arc<dyn Clock> {
    Arc::new(SystemClock)
}

/// Polls `condition` until it holds or five seconds pass.
pub fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    condition()
}
