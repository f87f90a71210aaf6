//! Windowed traffic rates computed from a buffer snapshot.

use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

use serde::Serialize;

use crate::events::{NetworkEvent, Protocol};

/// Rolling traffic figures over one window. All-zero when the window is empty.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TrafficMetrics {
    pub window: Duration,
    pub event_count: usize,
    pub events_per_second: f64,
    pub bytes_per_second: f64,
    pub unique_sources: usize,
    pub unique_destinations: usize,
    pub protocol_distribution: BTreeMap<Protocol, usize>,
}

impl TrafficMetrics {
    /// Aggregates `events`, which the caller has already restricted to `window`.
    ///
    /// Rates divide by the full window length, not by the span the events
    /// happen to cover. A zero-length window yields zero rates.
    pub fn from_events<'a, I>(events: I, window: Duration) -> Self
    where
        I: IntoIterator<Item = &'a NetworkEvent>,
    {
        let mut metrics = TrafficMetrics {
            window,
            ..Default::default()
        };

        let mut sources = HashSet::new();
        let mut destinations = HashSet::new();
        let mut total_bytes: u128 = 0;

        for event in events {
            metrics.event_count += 1;
            total_bytes += u128::from(event.total_bytes());
            sources.insert(event.source.as_str());
            destinations.insert(event.destination.as_str());
            *metrics
                .protocol_distribution
                .entry(event.protocol)
                .or_insert(0) += 1;
        }

        metrics.unique_sources = sources.len();
        metrics.unique_destinations = destinations.len();

        let seconds = window.as_secs_f64();
        if metrics.event_count > 0 && seconds > 0.0 {
            metrics.events_per_second = metrics.event_count as f64 / seconds;
            metrics.bytes_per_second = total_bytes as f64 / seconds;
        }

        metrics
    }

    pub fn is_empty(&self) -> bool {
        self.event_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(src: &str, dst: &str, protocol: Protocol, sent: u64, received: u64) -> NetworkEvent {
        NetworkEvent::builder(0, src, dst)
            .protocol(protocol)
            .bytes(sent, received)
            .build()
    }

    #[test]
    fn empty_window_is_all_zero() {
        let metrics = TrafficMetrics::from_events(std::iter::empty(), Duration::from_secs(60));
        assert_eq!(metrics.events_per_second, 0.0);
        assert_eq!(metrics.bytes_per_second, 0.0);
        assert_eq!(metrics.unique_sources, 0);
        assert_eq!(metrics.unique_destinations, 0);
        assert!(metrics.protocol_distribution.is_empty());
        assert!(metrics.is_empty());
    }

    #[test]
    fn zero_length_window_does_not_divide() {
        let events = [event("a", "b", Protocol::Tcp, 10, 10)];
        let metrics = TrafficMetrics::from_events(&events, Duration::ZERO);
        assert_eq!(metrics.event_count, 1);
        assert_eq!(metrics.events_per_second, 0.0);
        assert_eq!(metrics.bytes_per_second, 0.0);
    }

    #[test]
    fn rates_use_full_window_length() {
        let events = [
            event("192.168.1.1", "10.0.0.1:80", Protocol::Tcp, 100, 50),
            event("192.168.1.1", "10.0.0.2:53", Protocol::Udp, 20, 30),
            event("192.168.1.2", "10.0.0.1:80", Protocol::Tcp, 0, 0),
            event("192.168.1.3", "10.0.0.3:0", Protocol::Icmp, 400, 0),
        ];

        let metrics = TrafficMetrics::from_events(&events, Duration::from_secs(2));

        assert_eq!(metrics.event_count, 4);
        assert_eq!(metrics.events_per_second, 2.0);
        assert_eq!(metrics.bytes_per_second, 300.0);
        assert_eq!(metrics.unique_sources, 3);
        assert_eq!(metrics.unique_destinations, 3);
        assert_eq!(metrics.protocol_distribution[&Protocol::Tcp], 2);
        assert_eq!(metrics.protocol_distribution[&Protocol::Udp], 1);
        assert_eq!(metrics.protocol_distribution[&Protocol::Icmp], 1);
    }
}
