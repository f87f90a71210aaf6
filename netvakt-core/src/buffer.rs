//! Fixed-capacity store of the most recent events.
//!
//! Ring semantics: once `capacity` events are held, every push evicts the
//! oldest one. Insertion order is preserved for iteration and windowing.

use std::collections::VecDeque;
use std::time::Duration;

use thiserror::Error;

use crate::events::NetworkEvent;
use crate::time::{duration_to_ns, Timestamp};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BufferError {
    #[error("Invalid capacity (must be greater than zero)")]
    InvalidCapacity,
}

#[derive(Debug, Clone)]
pub struct EventBuffer {
    events: VecDeque<NetworkEvent>,
    capacity: usize,
}

impl EventBuffer {
    /// Creates an empty buffer holding at most `capacity` events.
    pub fn with_capacity(capacity: usize) -> Result<Self, BufferError> {
        if capacity == 0 {
            return Err(BufferError::InvalidCapacity);
        }

        Ok(Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
        })
    }

    /// Appends `event`, returning the evicted oldest event when full.
    #[inline]
    pub fn push(&mut self, event: NetworkEvent) -> Option<NetworkEvent> {
        let evicted = if self.events.len() == self.capacity {
            self.events.pop_front()
        } else {
            None
        };
        self.events.push_back(event);
        evicted
    }

    /// Events stamped within `[now - window, now]`, in insertion order.
    ///
    /// The iterator borrows the buffer; callers that need to release a lock
    /// should collect it first.
    pub fn window(
        &self,
        window: Duration,
        now: Timestamp,
    ) -> impl Iterator<Item = &NetworkEvent> + '_ {
        let cutoff = now.saturating_sub(duration_to_ns(window));
        self.events
            .iter()
            .filter(move |event| event.timestamp >= cutoff && event.timestamp <= now)
    }

    /// The last `count` events, oldest first.
    pub fn recent(&self, count: usize) -> Vec<NetworkEvent> {
        let skip = self.events.len().saturating_sub(count);
        self.events.iter().skip(skip).cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NetworkEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
