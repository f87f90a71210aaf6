//! Source that plays back a fixed list of events, then reports exhaustion.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use netvakt_core::events::{EventSource, NetworkEvent, SourceError};
use netvakt_core::time::Clock;

pub struct ScriptedSource {
    events: Mutex<VecDeque<NetworkEvent>>,
    restamp: Option<Arc<dyn Clock>>,
}

impl ScriptedSource {
    pub fn new(events: impl IntoIterator<Item = NetworkEvent>) -> Self {
        Self {
            events: Mutex::new(events.into_iter().collect()),
            restamp: None,
        }
    }

    /// Replaces each event's timestamp with the clock reading at emission.
    pub fn restamped_by(mut self, clock: Arc<dyn Clock>) -> Self {
        self.restamp = Some(clock);
        self
    }

    /// Appends an event to the end of the script.
    pub fn push(&self, event: NetworkEvent) {
        self.events.lock().push_back(event);
    }

    pub fn remaining(&self) -> usize {
        self.events.lock().len()
    }
}

#[async_trait]
impl EventSource for ScriptedSource {
    async fn next_event(&self) -> Result<NetworkEvent, SourceError> {
        let event = self
            .events
            .lock()
            .pop_front()
            .ok_or(SourceError::Exhausted)?;
        Ok(match &self.restamp {
            Some(clock) => event.restamped(clock.now_ns()),
            None => event,
        })
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
