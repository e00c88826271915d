//! # Consumer-side subscription handle.
//!
//! A [`Subscription`] is one consumer's live connection to the bus. It owns a bounded
//! drop-oldest mailbox and exposes it as an async receive API and as a
//! [`Stream`](futures::Stream).
//!
//! ## State machine
//! ```text
//! Active ──(unsubscribe / drop / token fired / bus.unsubscribe(id))──► Cancelled
//! ```
//! `Cancelled` is terminal. Pending events are discarded on the transition and
//! every receive operation returns `None` afterwards.
//!
//! ## Example
//! ```rust
//! use notibus::{Event, EventBus, TransactionKind};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let bus = EventBus::default();
//! let sub = bus.subscribe();
//!
//! bus.publish(Event::new_transaction(1, 42.0, TransactionKind::Credit));
//!
//! let ev = sub.recv().await.expect("subscription is active");
//! assert_eq!(ev.id(), 1);
//! # }
//! ```

use std::fmt;
use std::sync::{Arc, Weak};

use futures::Stream;
use tokio_util::sync::CancellationToken;

use crate::bus::BusCore;
use crate::events::Event;
use crate::subscription::SubscriptionId;
use crate::subscription::mailbox::Mailbox;

/// Live registration of one consumer.
///
/// Dropping the handle unsubscribes it.
pub struct Subscription {
    id: SubscriptionId,
    mailbox: Arc<Mailbox>,
    bus: Weak<BusCore>,
}

impl Subscription {
    pub(crate) fn new(id: SubscriptionId, mailbox: Arc<Mailbox>, bus: Weak<BusCore>) -> Self {
        Self { id, mailbox, bus }
    }

    /// Identifier of this subscription within its bus.
    #[inline]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Maximum number of pending events held for this subscription.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.mailbox.capacity()
    }

    /// Number of events currently pending.
    #[inline]
    pub fn len(&self) -> usize {
        self.mailbox.len()
    }

    /// Returns `true` when no events are pending.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of events evicted by the drop-oldest overflow policy so far.
    #[inline]
    pub fn dropped(&self) -> u64 {
        self.mailbox.dropped()
    }

    /// Returns `true` once the subscription reached the terminal `Cancelled` state.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.mailbox.is_cancelled()
    }

    /// Waits for the next event.
    ///
    /// - Returns `None` once the subscription is cancelled.
    /// - Cancellation-safe: dropping the future (e.g. in `select!` or
    ///   `tokio::time::timeout`) never loses a queued event.
    pub async fn recv(&self) -> Option<Event> {
        self.mailbox.recv().await
    }

    /// Returns the next pending event without waiting.
    pub fn try_recv(&self) -> Option<Event> {
        self.mailbox.pop()
    }

    /// Waits for the next event or for `token` to fire.
    ///
    /// If the token fires first the subscription is cancelled and `None` is returned.
    pub async fn recv_until(&self, token: &CancellationToken) -> Option<Event> {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                self.unsubscribe();
                None
            }
            ev = self.mailbox.recv() => ev,
        }
    }

    /// Converts the handle into a lazy stream of events.
    ///
    /// The stream ends when the subscription is cancelled; dropping the stream
    /// unsubscribes.
    pub fn into_stream(self) -> impl Stream<Item = Event> + Send + 'static {
        futures::stream::unfold(self, |sub| async move {
            let ev = sub.recv().await?;
            Some((ev, sub))
        })
    }

    /// Cancels the subscription. Safe to call any number of times.
    pub fn unsubscribe(&self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.remove(self.id);
        }
        self.mailbox.close();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("capacity", &self.capacity())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
