//! Seeded synthetic traffic generator.
//!
//! Produces KDD-style connection records with uniformly drawn baseline
//! features. A configurable share of events is reshaped into one of four
//! attack fingerprints (dos, probe, r2l, u2r) before being emitted.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use netvakt_config::SimulatorConfig;
use netvakt_core::events::{
    ConnectionFlag, EventSource, FeatureVector, NetworkEvent, Protocol, SourceError,
};
use netvakt_core::time::Clock;

use crate::chaos::FaultInjector;

/// Flags the generator draws from. `RSTOS0` never appears in generated traffic.
const GENERATED_FLAGS: [ConnectionFlag; 6] = [
    ConnectionFlag::SF,
    ConnectionFlag::S0,
    ConnectionFlag::REJ,
    ConnectionFlag::RSTR,
    ConnectionFlag::RSTO,
    ConnectionFlag::SH,
];

/// Attack pattern stamped onto a generated event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InjectedAttack {
    Dos,
    Probe,
    R2l,
    U2r,
}

impl InjectedAttack {
    pub const ALL: [InjectedAttack; 4] = [
        InjectedAttack::Dos,
        InjectedAttack::Probe,
        InjectedAttack::R2l,
        InjectedAttack::U2r,
    ];
}

pub struct SyntheticSource {
    name: String,
    seed: u64,
    threat_probability: f64,
    faults: FaultInjector,
    clock: Arc<dyn Clock>,
    rng: Mutex<StdRng>,
}

impl SyntheticSource {
    pub fn new(seed: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            name: format!("synthetic(seed={seed})"),
            seed,
            threat_probability: 0.1,
            faults: FaultInjector::disabled(),
            clock,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn from_config(config: &SimulatorConfig, clock: Arc<dyn Clock>) -> Self {
        Self::new(config.seed, clock)
            .with_threat_probability(config.threat_probability)
            .with_fault_probability(config.chaos.fault_probability)
    }

    /// Share of events reshaped into an attack, clamped to `[0, 1]`.
    pub fn with_threat_probability(mut self, probability: f64) -> Self {
        self.threat_probability = clamp_probability(probability);
        self
    }

    /// Probability that a `next_event` call fails with `Unavailable`.
    pub fn with_fault_probability(mut self, probability: f64) -> Self {
        self.faults = FaultInjector::new(probability);
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn now(&self) -> u64 {
        self.clock.now_ns()
    }

    /// Draws one event, never failing.
    pub fn generate(&self) -> NetworkEvent {
        self.generate_labeled().0
    }

    /// Draws one event along with the attack injected into it, if any.
    pub fn generate_labeled(&self) -> (NetworkEvent, Option<InjectedAttack>) {
        let mut rng = self.rng.lock();
        draw_event(&mut *rng, self.threat_probability, self.clock.now_ns())
    }
}

#[async_trait]
impl EventSource for SyntheticSource {
    async fn next_event(&self) -> Result<NetworkEvent, SourceError> {
        let mut rng = self.rng.lock();
        self.faults.roll(&mut *rng)?;
        Ok(draw_event(&mut *rng, self.threat_probability, self.clock.now_ns()).0)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

pub(crate) fn clamp_probability(probability: f64) -> f64 {
    if probability.is_nan() {
        0.0
    } else {
        probability.clamp(0.0, 1.0)
    }
}

fn draw_event<R: Rng + ?Sized>(
    rng: &mut R,
    threat_probability: f64,
    timestamp: u64,
) -> (NetworkEvent, Option<InjectedAttack>) {
    let source = format!(
        "192.168.{}.{}",
        rng.random_range(1..=254u8),
        rng.random_range(1..=254u8)
    );
    let destination = format!(
        "10.0.{}.{}:{}",
        rng.random_range(0..=255u8),
        rng.random_range(1..=254u8),
        rng.random_range(1..=65535u16)
    );

    let mut features = baseline_features(rng);
    let attack = if rng.random_bool(threat_probability) {
        let attack = InjectedAttack::ALL[rng.random_range(0..InjectedAttack::ALL.len())];
        reshape(&mut features, attack, rng);
        Some(attack)
    } else {
        None
    };

    let feature = |name: &str| features.get(name).unwrap_or_default();
    let event = NetworkEvent::builder(timestamp, source, destination)
        .protocol(Protocol::ALL[rng.random_range(0..Protocol::ALL.len())])
        .bytes(feature("src_bytes") as u64, feature("dst_bytes") as u64)
        .duration(feature("duration"))
        .flag(GENERATED_FLAGS[rng.random_range(0..GENERATED_FLAGS.len())])
        .packet_count(rng.random_range(1..=100))
        .features(features)
        .build();

    (event, attack)
}

/// Uniform baseline over the 16-feature traffic schema.
fn baseline_features<R: Rng + ?Sized>(rng: &mut R) -> FeatureVector {
    let mut features = FeatureVector::with_capacity(16);
    features.insert("duration", rng.random_range(0.0..1000.0));
    features.insert("src_bytes", rng.random_range(0..=100_000u32) as f64);
    features.insert("dst_bytes", rng.random_range(0..=100_000u32) as f64);
    features.insert("wrong_fragment", rng.random_range(0..=3u8) as f64);
    features.insert("urgent", rng.random_range(0..=3u8) as f64);
    features.insert("hot", rng.random_range(0..=100u8) as f64);
    features.insert("num_failed_logins", rng.random_range(0..=5u8) as f64);
    features.insert("logged_in", rng.random_range(0..=1u8) as f64);
    features.insert("num_compromised", rng.random_range(0..=50u8) as f64);
    features.insert("count", rng.random_range(0..=100u8) as f64);
    features.insert("srv_count", rng.random_range(0..=100u8) as f64);
    features.insert("serror_rate", rng.random::<f64>());
    features.insert("srv_serror_rate", rng.random::<f64>());
    features.insert("rerror_rate", rng.random::<f64>());
    features.insert("same_srv_rate", rng.random::<f64>());
    features.insert("diff_srv_rate", rng.random::<f64>());
    features
}

fn reshape<R: Rng + ?Sized>(features: &mut FeatureVector, attack: InjectedAttack, rng: &mut R) {
    let get = |features: &FeatureVector, name: &str| features.get(name).unwrap_or_default();
    match attack {
        InjectedAttack::Dos => {
            features.insert("duration", get(features, "duration") * 10.0);
            features.insert("src_bytes", get(features, "src_bytes") * 5.0);
            features.insert("serror_rate", rng.random_range(0.5..=1.0));
            features.insert("count", rng.random_range(50..=100u8) as f64);
        }
        InjectedAttack::Probe => {
            features.insert("count", rng.random_range(80..=100u8) as f64);
            features.insert("srv_count", rng.random_range(80..=100u8) as f64);
            features.insert("src_bytes", (get(features, "src_bytes") / 10.0).floor());
            features.insert("dst_bytes", (get(features, "dst_bytes") / 10.0).floor());
        }
        InjectedAttack::R2l => {
            features.insert("num_failed_logins", rng.random_range(3..=5u8) as f64);
            features.insert("num_compromised", rng.random_range(10..=30u8) as f64);
            features.insert("logged_in", 1.0);
        }
        InjectedAttack::U2r => {
            features.insert("logged_in", 1.0);
            features.insert("num_compromised", rng.random_range(5..=20u8) as f64);
            features.insert("hot", rng.random_range(50..=100u8) as f64);
        }
    }
}
