//! # LogWriter: `tracing`-backed observer
//!
//! Emits one structured `tracing` event per bus activity under the `notibus` target.
//!
//! ## Example output (fmt subscriber)
//! ```text
//! DEBUG notibus: subscribed sub=sub-0 sink="mailbox"
//! DEBUG notibus: published event="new_transaction" id=42 delivered=2
//!  WARN notibus: overflow, dropped oldest sub=sub-0 evicted="deleted id=7"
//! ERROR notibus: delivery failed, suppressed sub=sub-1 op="publish" event="deleted id=9" err=delivery_sink reason="sink bridge rejected event: offline"
//! DEBUG notibus: unsubscribed sub=sub-0
//! ```

use crate::error::DeliveryError;
use crate::events::Event;
use crate::observers::Observer;
use crate::subscription::SubscriptionId;

const TARGET: &str = "notibus";

/// Observer writing structured `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Observer for LogWriter {
    fn on_published(&self, event: &Event, delivered: usize) {
        tracing::debug!(
            target: TARGET,
            event = event.as_label(),
            id = event.id(),
            delivered,
            "published"
        );
    }

    fn on_overflow(&self, sub: SubscriptionId, evicted: &Event) {
        tracing::warn!(
            target: TARGET,
            sub = %sub,
            evicted = %evicted,
            "overflow, dropped oldest"
        );
    }

    fn on_delivery_failure(
        &self,
        sub: SubscriptionId,
        event: &Event,
        op: &'static str,
        err: &DeliveryError,
    ) {
        tracing::error!(
            target: TARGET,
            sub = %sub,
            op,
            event = %event,
            err = err.as_label(),
            reason = %err,
            "delivery failed, suppressed"
        );
    }

    fn on_subscribed(&self, sub: SubscriptionId, sink: &'static str) {
        tracing::debug!(target: TARGET, sub = %sub, sink, "subscribed");
    }

    fn on_unsubscribed(&self, sub: SubscriptionId) {
        tracing::debug!(target: TARGET, sub = %sub, "unsubscribed");
    }
}
