//! # Bus configuration.
//!
//! [`BusConfig`] holds the settings applied to every subscription created through
//! [`EventBus::subscribe`](crate::EventBus::subscribe).
//!
//! ## Sentinel values
//! - `queue_capacity = 0` → clamped to 1 (a subscription always holds the latest event)

/// Configuration for an [`EventBus`](crate::EventBus).
///
/// ## Field semantics
/// - `queue_capacity`: pending events kept per subscription before drop-oldest kicks in
///
/// New subscribers never receive events published before they subscribed,
/// regardless of capacity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BusConfig {
    /// Default per-subscription queue capacity.
    ///
    /// When a subscription has this many unconsumed events, the next publish evicts
    /// the oldest one. Override per subscription with
    /// [`EventBus::subscribe_with_capacity`](crate::EventBus::subscribe_with_capacity).
    pub queue_capacity: usize,
}

impl BusConfig {
    /// Default queue capacity (10 pending events).
    pub const DEFAULT_QUEUE_CAPACITY: usize = 10;

    /// Creates a config with the given per-subscription capacity.
    #[must_use]
    pub fn with_queue_capacity(queue_capacity: usize) -> Self {
        Self { queue_capacity }
    }

    /// Returns the queue capacity clamped to a minimum of 1.
    #[inline]
    pub fn queue_capacity_clamped(&self) -> usize {
        self.queue_capacity.max(1)
    }
}

impl Default for BusConfig {
    /// Default configuration:
    ///
    /// - `queue_capacity = 10` (enough for "refresh your view" notifications)
    fn default() -> Self {
        Self {
            queue_capacity: Self::DEFAULT_QUEUE_CAPACITY,
        }
    }
}
