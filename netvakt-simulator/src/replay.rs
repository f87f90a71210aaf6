//! Replay module.
//!
//! Plays a recorded [`Scenario`] back in order. Each emitted event is
//! re-stamped with the replaying clock so windowed metrics see live traffic.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use netvakt_core::events::{EventSource, NetworkEvent, SourceError};
use netvakt_core::time::Clock;

use crate::scenario::Scenario;

pub struct ReplaySource {
    events: Vec<NetworkEvent>,
    cursor: Mutex<usize>,
    looping: bool,
    clock: Arc<dyn Clock>,
    name: String,
}

impl ReplaySource {
    pub fn new(scenario: Scenario, clock: Arc<dyn Clock>) -> Self {
        Self {
            name: format!("replay(seed={})", scenario.seed),
            events: scenario.events,
            cursor: Mutex::new(0),
            looping: false,
            clock,
        }
    }

    /// Restart from the first event once the scenario runs out.
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[async_trait]
impl EventSource for ReplaySource {
    async fn next_event(&self) -> Result<NetworkEvent, SourceError> {
        let mut cursor = self.cursor.lock();
        if *cursor >= self.events.len() {
            if !self.looping || self.events.is_empty() {
                return Err(SourceError::Exhausted);
            }
            *cursor = 0;
        }
        let event = self.events[*cursor].restamped(self.clock.now_ns());
        *cursor += 1;
        Ok(event)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::SyntheticSource;
    use netvakt_core::time::VirtualClock;
    use std::time::Duration;

    fn scenario(count: usize) -> Scenario {
        let source = SyntheticSource::new(4, Arc::new(VirtualClock::new(0)));
        Scenario::record(&source, count)
    }

    #[tokio::test]
    async fn replays_in_order_with_fresh_timestamps() {
        let recorded = scenario(3);
        let clock = VirtualClock::new(1_000_000);
        let replay = ReplaySource::new(recorded.clone(), Arc::new(clock.clone()));

        for original in &recorded.events {
            clock.advance(Duration::from_millis(1));
            let event = replay.next_event().await.unwrap();
            assert_eq!(event.timestamp, clock.now_ns());
            assert_eq!(event.source, original.source);
            assert_eq!(event.features, original.features);
        }
        assert_eq!(replay.next_event().await, Err(SourceError::Exhausted));
    }

    #[tokio::test]
    async fn looping_wraps_around() {
        let recorded = scenario(2);
        let replay =
            ReplaySource::new(recorded.clone(), Arc::new(VirtualClock::new(0))).looping(true);
        let sources: Vec<_> = {
            let mut out = Vec::new();
            for _ in 0..5 {
                out.push(replay.next_event().await.unwrap().source);
            }
            out
        };
        assert_eq!(sources[0], sources[2]);
        assert_eq!(sources[1], sources[3]);
        assert_eq!(sources[4], recorded.events[0].source);
    }

    #[tokio::test]
    async fn empty_looping_scenario_still_exhausts() {
        let replay = ReplaySource::new(Scenario::new(0, 0, Vec::new()), Arc::new(VirtualClock::new(0)))
            .looping(true);
        assert_eq!(replay.next_event().await, Err(SourceError::Exhausted));
    }
}
