//! Pull interface over whatever produces traffic descriptors.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use super::network::NetworkEvent;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum SourceError {
    #[error("Event source unavailable: {0}")]
    Unavailable(String),

    #[error("Event source has no more events")]
    Exhausted,

    #[error("Event source did not answer within {0:?}")]
    Timeout(Duration),
}

/// A producer of network events: synthetic generator, replay log or capture.
///
/// `next_event` is called once per monitor iteration. Implementations should
/// answer promptly; the monitor also bounds each call with its own timeout
/// and treats any error as a transient fault for that iteration.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Retrieves the next event from the source.
    async fn next_event(&self) -> Result<NetworkEvent, SourceError>;

    /// Short label used in logs and diagnostics.
    fn name(&self) -> &str;
}
