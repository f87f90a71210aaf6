//! Network event types and their feature vectors.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::time::Timestamp;

/// Transport protocol of an observed interaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    Tcp,
    Udp,
    Icmp,
}

impl Protocol {
    pub const ALL: [Protocol; 3] = [Protocol::Tcp, Protocol::Udp, Protocol::Icmp];

    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "TCP",
            Protocol::Udp => "UDP",
            Protocol::Icmp => "ICMP",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection state tag, using the KDD connection-status vocabulary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionFlag {
    SF,
    S0,
    REJ,
    RSTR,
    RSTO,
    SH,
    RSTOS0,
}

impl ConnectionFlag {
    pub const ALL: [ConnectionFlag; 7] = [
        ConnectionFlag::SF,
        ConnectionFlag::S0,
        ConnectionFlag::REJ,
        ConnectionFlag::RSTR,
        ConnectionFlag::RSTO,
        ConnectionFlag::SH,
        ConnectionFlag::RSTOS0,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionFlag::SF => "SF",
            ConnectionFlag::S0 => "S0",
            ConnectionFlag::REJ => "REJ",
            ConnectionFlag::RSTR => "RSTR",
            ConnectionFlag::RSTO => "RSTO",
            ConnectionFlag::SH => "SH",
            ConnectionFlag::RSTOS0 => "RSTOS0",
        }
    }
}

impl fmt::Display for ConnectionFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection-level feature names, in schema order, produced by the bundled
/// traffic sources.
pub const TRAFFIC_FEATURE_SCHEMA: [&str; 16] = [
    "duration",
    "src_bytes",
    "dst_bytes",
    "wrong_fragment",
    "urgent",
    "hot",
    "num_failed_logins",
    "logged_in",
    "num_compromised",
    "count",
    "srv_count",
    "serror_rate",
    "srv_serror_rate",
    "rerror_rate",
    "same_srv_rate",
    "diff_srv_rate",
];

/// Position of `name` in [`TRAFFIC_FEATURE_SCHEMA`].
pub fn schema_index(name: &str) -> Option<usize> {
    TRAFFIC_FEATURE_SCHEMA.iter().position(|field| *field == name)
}

/// Ordered mapping of named numeric attributes consumed by a classifier.
///
/// Insertion order is the schema order. Inserting a key that already exists
/// replaces its value without moving it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeatureVector {
    entries: Vec<(String, f64)>,
}

impl FeatureVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        let name = name.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| *value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Values in schema order.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(|(_, value)| *value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), *value))
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for FeatureVector {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut features = FeatureVector::new();
        for (name, value) in iter {
            features.insert(name, value);
        }
        features
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FeatureVector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = FeatureVector;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of feature names to numbers")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut features = FeatureVector::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, value)) = access.next_entry::<String, f64>()? {
                    features.insert(name, value);
                }
                Ok(features)
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}

/// One observed traffic sample plus its raw feature vector.
///
/// Events are immutable once built; consumers receive clones.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NetworkEvent {
    /// Nanoseconds since the UNIX epoch, taken from the producing clock.
    pub timestamp: Timestamp,
    pub source: String,
    pub destination: String,
    pub protocol: Protocol,
    pub bytes_sent: u64,
    pub bytes_received: u64,
    /// Connection duration in seconds, never negative.
    #[serde(deserialize_with = "deserialize_duration")]
    pub duration: f64,
    pub flag: ConnectionFlag,
    #[serde(default)]
    pub packet_count: u32,
    #[serde(default)]
    pub features: FeatureVector,
}

impl NetworkEvent {
    pub fn builder(
        timestamp: Timestamp,
        source: impl Into<String>,
        destination: impl Into<String>,
    ) -> NetworkEventBuilder {
        NetworkEventBuilder {
            event: NetworkEvent {
                timestamp,
                source: source.into(),
                destination: destination.into(),
                protocol: Protocol::Tcp,
                bytes_sent: 0,
                bytes_received: 0,
                duration: 0.0,
                flag: ConnectionFlag::SF,
                packet_count: 0,
                features: FeatureVector::new(),
            },
        }
    }

    /// Total bytes moved in both directions.
    #[inline]
    pub fn total_bytes(&self) -> u64 {
        self.bytes_sent.saturating_add(self.bytes_received)
    }

    /// Returns a copy of this event stamped with a new timestamp.
    pub fn restamped(&self, timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            ..self.clone()
        }
    }
}

fn clamp_duration(seconds: f64) -> f64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    }
}

fn deserialize_duration<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    f64::deserialize(deserializer).map(clamp_duration)
}

pub struct NetworkEventBuilder {
    event: NetworkEvent,
}

impl NetworkEventBuilder {
    pub fn protocol(mut self, protocol: Protocol) -> Self {
        self.event.protocol = protocol;
        self
    }

    pub fn bytes(mut self, sent: u64, received: u64) -> Self {
        self.event.bytes_sent = sent;
        self.event.bytes_received = received;
        self
    }

    /// Negative or non-finite durations are clamped to zero.
    pub fn duration(mut self, seconds: f64) -> Self {
        self.event.duration = clamp_duration(seconds);
        self
    }

    pub fn flag(mut self, flag: ConnectionFlag) -> Self {
        self.event.flag = flag;
        self
    }

    pub fn packet_count(mut self, packets: u32) -> Self {
        self.event.packet_count = packets;
        self
    }

    pub fn features(mut self, features: FeatureVector) -> Self {
        self.event.features = features;
        self
    }

    pub fn build(self) -> NetworkEvent {
        self.event
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_insert_keeps_schema_order() {
        let mut features = FeatureVector::new();
        features.insert("duration", 1.0);
        features.insert("src_bytes", 2.0);
        features.insert("duration", 3.0);

        assert_eq!(features.len(), 2);
        assert_eq!(features.names().collect::<Vec<_>>(), ["duration", "src_bytes"]);
        assert_eq!(features.values().collect::<Vec<_>>(), [3.0, 2.0]);
    }

    #[test]
    fn features_serialize_as_ordered_map() {
        let features: FeatureVector = [("zeta", 1.0), ("alpha", 2.0)].into_iter().collect();
        let yaml = serde_yaml::to_string(&features).unwrap();
        assert!(yaml.find("zeta").unwrap() < yaml.find("alpha").unwrap());

        let parsed: FeatureVector = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, features);
    }

    #[test]
    fn builder_clamps_bad_durations() {
        let event = NetworkEvent::builder(1, "a", "b").duration(-4.0).build();
        assert_eq!(event.duration, 0.0);
        let event = NetworkEvent::builder(1, "a", "b").duration(f64::NAN).build();
        assert_eq!(event.duration, 0.0);
    }

    #[test]
    fn deserialized_durations_are_clamped() {
        let event = NetworkEvent::builder(1, "a", "b").duration(0.5).build();
        let yaml = serde_yaml::to_string(&event).unwrap();
        assert!(yaml.contains("duration: 0.5"));

        let negative: NetworkEvent =
            serde_yaml::from_str(&yaml.replace("duration: 0.5", "duration: -3.5")).unwrap();
        assert_eq!(negative.duration, 0.0);

        let nan: NetworkEvent =
            serde_yaml::from_str(&yaml.replace("duration: 0.5", "duration: .nan")).unwrap();
        assert_eq!(nan.duration, 0.0);

        let parsed: NetworkEvent = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn total_bytes_saturates() {
        let event = NetworkEvent::builder(1, "a", "b").bytes(u64::MAX, 10).build();
        assert_eq!(event.total_bytes(), u64::MAX);
    }
}
