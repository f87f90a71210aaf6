//! ## netvakt-core::time
//! **Wall and virtual clocks**
//!
//! Every timestamp in netvakt is a `u64` count of nanoseconds since the UNIX
//! epoch. Production code reads [`SystemClock`]; tests and replays drive a
//! [`VirtualClock`] so windowed metrics stay deterministic.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Nanoseconds since the UNIX epoch.
pub type Timestamp = u64;

pub trait Clock: Send + Sync {
    fn now_ns(&self) -> Timestamp;
}

/// Reads the operating system wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ns(&self) -> Timestamp {
        // A clock set before 1970 reads as the epoch instead of failing.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos() as u64)
            .unwrap_or(0)
    }
}

/// Manually advanced clock. Clones share the same time line.
#[derive(Clone, Debug)]
pub struct VirtualClock {
    offset: Arc<AtomicU64>, // Nanoseconds
}

impl VirtualClock {
    pub fn new(start_ns: Timestamp) -> Self {
        Self {
            offset: Arc::new(AtomicU64::new(start_ns)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset
            .fetch_add(duration_to_ns(by), Ordering::Release);
    }

    pub fn set(&self, now_ns: Timestamp) {
        self.offset.store(now_ns, Ordering::Release);
    }
}

impl Clock for VirtualClock {
    fn now_ns(&self) -> Timestamp {
        self.offset.load(Ordering::Acquire)
    }
}

/// Converts a duration to whole nanoseconds, saturating at `u64::MAX`.
#[inline]
pub fn duration_to_ns(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn virtual_clock_clones_share_time() {
        let clock = VirtualClock::new(10);
        let shared = clock.clone();
        clock.advance(Duration::from_nanos(5));
        assert_eq!(shared.now_ns(), 15);
        shared.set(100);
        assert_eq!(clock.now_ns(), 100);
    }

    #[test]
    fn system_clock_is_after_2020() {
        // 2020-01-01T00:00:00Z
        assert!(SystemClock.now_ns() > 1_577_836_800 * 1_000_000_000);
    }

    #[test]
    fn huge_durations_saturate() {
        assert_eq!(duration_to_ns(Duration::MAX), u64::MAX);
    }
}
