//! # Subscriber registry.
//!
//! Holds the fan-out set: every active registration keyed by [`SubscriptionId`].
//!
//! ## Rules
//! - Ids come from a per-registry counter and are never reused.
//! - `snapshot()` clones the `Arc`s under a read lock and releases it before any
//!   delivery runs, so subscribe/unsubscribe never wait on a fan-out in progress.
//! - `BTreeMap` keeps fan-out in registration order.
//! - A poisoned lock is recovered: insert/remove/clone cannot leave the map torn.
//! - The sink name is captured once at registration; fan-out never calls back into
//!   `Deliver::name`.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::subscription::{Deliver, SubscriptionId};

/// One registration in the fan-out set.
#[derive(Clone)]
pub(crate) struct Entry {
    pub(crate) name: &'static str,
    pub(crate) sink: Arc<dyn Deliver>,
}

pub(crate) struct Registry {
    next_id: AtomicU64,
    sinks: RwLock<BTreeMap<SubscriptionId, Entry>>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self {
            next_id: AtomicU64::new(0),
            sinks: RwLock::new(BTreeMap::new()),
        }
    }

    /// Registers a sink and returns its id.
    pub(crate) fn insert(&self, name: &'static str, sink: Arc<dyn Deliver>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.sinks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Entry { name, sink });
        id
    }

    /// Removes a sink. Returns `None` if it was already gone.
    pub(crate) fn remove(&self, id: SubscriptionId) -> Option<Arc<dyn Deliver>> {
        self.sinks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .map(|entry| entry.sink)
    }

    /// Copies the current fan-out set.
    pub(crate) fn snapshot(&self) -> Vec<(SubscriptionId, Entry)> {
        self.sinks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(id, entry)| (*id, entry.clone()))
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.sinks.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Removes every sink, returning them for closing.
    pub(crate) fn drain(&self) -> Vec<(SubscriptionId, Arc<dyn Deliver>)> {
        std::mem::take(&mut *self.sinks.write().unwrap_or_else(PoisonError::into_inner))
            .into_iter()
            .map(|(id, entry)| (id, entry.sink))
            .collect()
    }
}
