//! # Bounded drop-oldest mailbox.
//!
//! One [`Mailbox`] backs each [`Subscription`](crate::Subscription).
//!
//! ```text
//! publish() ──► push ──► [ e3 e4 e5 ]  (capacity 3)
//!                           ▲      │
//!                 evict e2 ─┘      └──► pop ──► recv()
//! ```
//!
//! ## Rules
//! - `len() <= capacity` at all times.
//! - Full queue: the **oldest** event is evicted, the new one is admitted.
//! - FIFO order between push and pop.
//! - After `close()` the queue is empty, pushes return `Closed`, pops return `None`.
//! - The lock is never held across an await point.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::sync::Notify;

use crate::error::DeliveryError;
use crate::events::Event;
use crate::subscription::{Deliver, Delivery};

/// Upper bound on slots reserved up front; larger queues grow on demand.
const PREALLOC_LIMIT: usize = 16;

pub(crate) struct Mailbox {
    queue: Mutex<VecDeque<Event>>,
    capacity: usize,
    notify: Notify,
    cancelled: AtomicBool,
    dropped: AtomicU64,
}

impl Mailbox {
    /// Creates an empty mailbox. Capacity is clamped to a minimum of 1.
    pub(crate) fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            queue: Mutex::new(VecDeque::with_capacity(capacity.min(PREALLOC_LIMIT))),
            capacity,
            notify: Notify::new(),
            cancelled: AtomicBool::new(false),
            dropped: AtomicU64::new(0),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub(crate) fn len(&self) -> usize {
        match self.queue.lock() {
            Ok(q) => q.len(),
            Err(_) => 0,
        }
    }

    /// Enqueues `event`, evicting the oldest pending event when full.
    pub(crate) fn push(&self, event: Event) -> Result<Delivery, DeliveryError> {
        if self.is_cancelled() {
            return Err(DeliveryError::Closed);
        }
        let mut queue = self
            .queue
            .lock()
            .map_err(|_| DeliveryError::Poisoned { what: "mailbox" })?;

        // close() clears under the lock; re-check so nothing lands after it.
        if self.is_cancelled() {
            return Err(DeliveryError::Closed);
        }

        let evicted = if queue.len() >= self.capacity {
            queue.pop_front()
        } else {
            None
        };
        queue.push_back(event);
        drop(queue);

        self.notify.notify_one();

        match evicted {
            Some(old) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                Ok(Delivery::Evicted(old))
            }
            None => Ok(Delivery::Enqueued),
        }
    }

    /// Pops the oldest pending event without waiting.
    ///
    /// Returns `None` when empty or cancelled. A poisoned queue cancels the mailbox.
    pub(crate) fn pop(&self) -> Option<Event> {
        if self.is_cancelled() {
            return None;
        }
        match self.queue.lock() {
            Ok(mut q) => q.pop_front(),
            Err(_) => {
                self.cancelled.store(true, Ordering::Release);
                None
            }
        }
    }

    /// Waits for the next event.
    ///
    /// Cancellation-safe: dropping the returned future never loses a queued event.
    pub(crate) async fn recv(&self) -> Option<Event> {
        loop {
            if let Some(ev) = self.pop() {
                return Some(ev);
            }
            if self.is_cancelled() {
                return None;
            }
            // notify_one() leaves a permit when nobody waits, so a push between
            // pop() and here is not missed.
            self.notify.notified().await;
        }
    }

    /// Transitions to `Cancelled`: discards pending events and wakes waiters.
    ///
    /// Idempotent.
    pub(crate) fn close(&self) {
        if self.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Ok(mut q) = self.queue.lock() {
            q.clear();
        }
        self.notify.notify_waiters();
        self.notify.notify_one();
    }
}

impl Deliver for Mailbox {
    fn deliver(&self, event: &Event) -> Result<Delivery, DeliveryError> {
        self.push(event.clone())
    }

    fn close(&self) {
        Mailbox::close(self);
    }

    fn name(&self) -> &'static str {
        "mailbox"
    }
}
