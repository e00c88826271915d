//! Subscriptions: consumer handles and the per-subscription delivery seam.
//!
//! ## Contents
//! - [`Subscription`] live, cancellable consumer handle (async `recv`, `Stream`)
//! - [`Deliver`] trait implemented by everything the bus fans out to
//! - [`Delivery`] outcome of one delivery (queued or queued-with-eviction)
//! - [`SubscriptionId`] bus-unique registration id
//!
//! ```text
//! EventBus::publish ──► Deliver::deliver ──► Mailbox (bounded, drop-oldest)
//!                                                │
//!                                                └──► Subscription::recv / Stream
//! ```

mod mailbox;
mod sink;
#[allow(clippy::module_inception)]
mod subscription;

pub(crate) use mailbox::Mailbox;
pub use sink::{Deliver, Delivery, SubscriptionId};
pub use subscription::Subscription;
