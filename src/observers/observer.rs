//! # Observer: diagnostics hook for the bus
//!
//! The [`Observer`] trait is the injected diagnostics collaborator. The host
//! application decides where bus activity goes (structured logs, metrics, nothing)
//! by handing an observer to [`BusBuilder::with_observer`](crate::BusBuilder::with_observer).
//!
//! ```text
//! EventBus::publish(ev)
//!     ├─► Deliver::deliver  ──► Ok(Enqueued)      (counted)
//!     │                     ──► Ok(Evicted(old))  ──► Observer::on_overflow
//!     │                     ──► Err(e) / panic    ──► Observer::on_delivery_failure
//!     └─► Observer::on_published(ev, delivered)
//! ```
//!
//! Provided implementations:
//!   - [`LogWriter`](crate::LogWriter) (enabled via `logging` feature) → `tracing` events
//!   - [`NoopObserver`] → discards everything
//!
//! # Example: counting overflows
//! ```
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use notibus::{Event, Observer, SubscriptionId};
//!
//! #[derive(Default)]
//! struct OverflowCounter(AtomicU64);
//!
//! impl Observer for OverflowCounter {
//!     fn on_overflow(&self, _sub: SubscriptionId, _evicted: &Event) {
//!         self.0.fetch_add(1, Ordering::Relaxed);
//!     }
//! }
//! ```

use crate::error::DeliveryError;
use crate::events::Event;
use crate::subscription::SubscriptionId;

/// # Trait for observing bus activity.
///
/// All hooks are called synchronously on the publisher's (or unsubscriber's) thread,
/// so implementations must be cheap and must not block. Panics are caught and ignored.
///
/// Every hook defaults to a no-op.
pub trait Observer: Send + Sync + 'static {
    /// An event finished fan-out; `delivered` subscriptions accepted it.
    fn on_published(&self, _event: &Event, _delivered: usize) {}

    /// A full queue evicted its oldest event to admit a new one.
    fn on_overflow(&self, _sub: SubscriptionId, _evicted: &Event) {}

    /// Delivery to one subscription failed and was suppressed.
    ///
    /// `op` names the bus operation that was running (e.g. `"publish"`).
    fn on_delivery_failure(
        &self,
        _sub: SubscriptionId,
        _event: &Event,
        _op: &'static str,
        _err: &DeliveryError,
    ) {
    }

    /// A registration was added. `sink` is the sink name.
    fn on_subscribed(&self, _sub: SubscriptionId, _sink: &'static str) {}

    /// A registration was removed.
    fn on_unsubscribed(&self, _sub: SubscriptionId) {}
}

/// Observer that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl Observer for NoopObserver {}
