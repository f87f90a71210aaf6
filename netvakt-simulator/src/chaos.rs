//! Chaos module.
//!
//! Fault injection for sources: a call fails with `SourceError::Unavailable`
//! at a configured probability. Used to exercise the monitor's recovery path.

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use netvakt_core::events::{EventSource, NetworkEvent, SourceError};

use crate::synthetic::clamp_probability;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaultInjector {
    probability: f64,
}

impl FaultInjector {
    pub fn new(probability: f64) -> Self {
        Self {
            probability: clamp_probability(probability),
        }
    }

    pub fn disabled() -> Self {
        Self { probability: 0.0 }
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Fails with `Unavailable` at the configured probability.
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<(), SourceError> {
        if self.probability > 0.0 && rng.random_bool(self.probability) {
            return Err(SourceError::Unavailable("injected fault".to_string()));
        }
        Ok(())
    }
}

/// Wraps any source with seeded fault injection.
pub struct ChaosSource<S> {
    inner: S,
    faults: FaultInjector,
    rng: Mutex<StdRng>,
    name: String,
}

impl<S: EventSource> ChaosSource<S> {
    pub fn new(inner: S, probability: f64, seed: u64) -> Self {
        let name = format!("chaos({})", inner.name());
        Self {
            inner,
            faults: FaultInjector::new(probability),
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            name,
        }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

#[async_trait]
impl<S: EventSource> EventSource for ChaosSource<S> {
    async fn next_event(&self) -> Result<NetworkEvent, SourceError> {
        self.faults.roll(&mut *self.rng.lock())?;
        self.inner.next_event().await
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripted::ScriptedSource;

    #[test]
    fn probability_is_clamped() {
        assert_eq!(FaultInjector::new(3.0).probability(), 1.0);
        assert_eq!(FaultInjector::new(-1.0).probability(), 0.0);
        assert_eq!(FaultInjector::new(f64::NAN).probability(), 0.0);
    }

    #[test]
    fn disabled_injector_never_fails() {
        let mut rng = StdRng::seed_from_u64(1);
        let injector = FaultInjector::disabled();
        assert!((0..1000).all(|_| injector.roll(&mut rng).is_ok()));
    }

    #[tokio::test]
    async fn wrapped_source_fails_then_passes_through() {
        let event = NetworkEvent::builder(1, "192.168.0.1", "10.0.0.1:80").build();
        let always = ChaosSource::new(ScriptedSource::new(vec![event.clone()]), 1.0, 3);
        assert!(matches!(
            always.next_event().await,
            Err(SourceError::Unavailable(_))
        ));
        assert_eq!(always.name(), "chaos(scripted)");

        let never = ChaosSource::new(ScriptedSource::new(vec![event.clone()]), 0.0, 3);
        assert_eq!(never.next_event().await, Ok(event));
    }
}
