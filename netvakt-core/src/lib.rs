//! # netvakt-core
//!
//! Foundation layer shared by every netvakt crate: the immutable event
//! model, the source contract, the bounded event buffer, clocks, and the
//! windowed traffic aggregator.
//!
//! ### Key Submodules:
//! - `events`: `NetworkEvent`, `FeatureVector` and the `EventSource` trait
//! - `buffer`: fixed-capacity, oldest-evict-first event store
//! - `time`: nanosecond timestamps with system and virtual clocks
//! - `traffic`: rates, endpoint cardinality and protocol mix over a window

pub mod buffer;
pub mod events;
pub mod time;
pub mod traffic;

pub mod prelude {
    pub use crate::buffer::*;
    pub use crate::events::*;
    pub use crate::time::*;
    pub use crate::traffic::*;
}

pub use buffer::{BufferError, EventBuffer};
pub use events::{EventSource, NetworkEvent, SourceError};
pub use time::{Clock, SystemClock, Timestamp, VirtualClock};
pub use traffic::TrafficMetrics;
