//! # Delivery sink trait.
//!
//! Provides [`Deliver`], the seam between the bus fan-out loop and whatever holds
//! pending events for one subscription.
//!
//! The built-in implementation is the per-subscription mailbox created by
//! [`EventBus::subscribe`](crate::EventBus::subscribe). Custom sinks can be
//! registered with [`EventBus::attach`](crate::EventBus::attach) to bridge events
//! into another system.
//!
//! ## Rules
//! - `deliver` runs on the **publisher's** thread: it must be O(1) and never wait.
//! - Errors and panics are caught by the bus, reported to the observer, and
//!   suppressed; other sinks still receive the event.
//! - Returning [`DeliveryError::Closed`](crate::DeliveryError::Closed) is a silent no-op.

use std::fmt;

use crate::error::DeliveryError;
use crate::events::Event;

/// Identifier assigned to every registration in the bus.
///
/// Identifiers are unique per bus instance and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(pub(crate) u64);

impl SubscriptionId {
    /// Raw numeric value, for logs.
    #[inline]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Outcome of a successful delivery.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    /// The event was queued without evicting anything.
    Enqueued,
    /// The queue was full: the returned (oldest) event was evicted to admit the new one.
    Evicted(Event),
}

/// Receiving end of one fan-out target.
pub trait Deliver: Send + Sync + 'static {
    /// Accepts one event. Called from inside [`EventBus::publish`](crate::EventBus::publish).
    fn deliver(&self, event: &Event) -> Result<Delivery, DeliveryError>;

    /// Called once when the registration is removed from the bus.
    fn close(&self) {}

    /// Returns the sink name used in diagnostics.
    ///
    /// The default uses `type_name::<Self>()`; override it with something short.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
