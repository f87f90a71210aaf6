//! ## netvakt-core::events
//! **Immutable traffic samples and the contract of their producers**
//!
//! - `network`: `NetworkEvent`, its closed protocol/flag sets and `FeatureVector`
//! - `source`: the `EventSource` pull trait every producer implements

pub mod network;
pub mod source;

pub use network::{
    schema_index, ConnectionFlag, FeatureVector, NetworkEvent, NetworkEventBuilder, Protocol,
    TRAFFIC_FEATURE_SCHEMA,
};
pub use source::{EventSource, SourceError};
