//! Bus-wide counters.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub(crate) struct BusStats {
    published: AtomicU64,
    delivered: AtomicU64,
    dropped: AtomicU64,
    failures: AtomicU64,
}

impl BusStats {
    pub(crate) fn record_publish(&self, delivered: usize) {
        self.published.fetch_add(1, Ordering::Relaxed);
        self.delivered.fetch_add(delivered as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_drop(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> BusStatsSnapshot {
        BusStatsSnapshot {
            published: self.published.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the bus counters.
///
/// Counters are updated with relaxed atomics; a snapshot taken while publishers run
/// may mix values from adjacent publishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BusStatsSnapshot {
    /// Calls to `publish`.
    pub published: u64,
    /// Successful enqueues summed over all subscriptions.
    pub delivered: u64,
    /// Events evicted by drop-oldest overflow.
    pub dropped: u64,
    /// Delivery failures that were suppressed.
    pub failures: u64,
}
