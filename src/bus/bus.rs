//! # Event bus for fanning out domain events to live subscribers.
//!
//! [`EventBus`] decouples background producers from any number of consumers.
//! Producers call [`EventBus::publish`], which never waits on a consumer; each
//! consumer owns a [`Subscription`] with its own bounded queue.
//!
//! ## Architecture
//! ```text
//! Producers (many):                          Consumers (many):
//!   parser  ──┐                          ┌──► [mailbox 0] ──► Subscription::recv()
//!   sync    ──┼──► EventBus::publish ────┼──► [mailbox 1] ──► Subscription stream
//!   import  ──┘     (snapshot registry)  └──► custom Deliver sink (attach)
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: fan-out is one O(1) enqueue per subscription.
//! - **No replay**: an event reaches only subscriptions registered when it was published.
//! - **Drop-oldest**: a full queue evicts its oldest event; the newest is always kept.
//! - **Per-subscription FIFO**: no ordering across subscriptions.
//! - **Best effort**: delivery failures (sink errors, panics, poisoned locks) are
//!   reported to the [`Observer`] and suppressed; other subscriptions are unaffected.
//!
//! ## Wiring
//! Build one bus at startup and clone it into producers and consumers. Clones share
//! state. When the last clone is dropped every subscription is cancelled.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::bus::registry::Registry;
use crate::bus::stats::BusStats;
use crate::bus::{BusBuilder, BusConfig, BusStatsSnapshot};
use crate::error::DeliveryError;
use crate::events::Event;
use crate::observers::Observer;
use crate::subscription::{Deliver, Delivery, Mailbox, Subscription, SubscriptionId};

/// State shared by every clone of an [`EventBus`].
pub(crate) struct BusCore {
    cfg: BusConfig,
    registry: Registry,
    stats: BusStats,
    observer: Arc<dyn Observer>,
}

impl BusCore {
    /// Removes a registration and closes its sink. Returns `false` if it was already gone.
    pub(crate) fn remove(&self, id: SubscriptionId) -> bool {
        match self.registry.remove(id) {
            Some(sink) => {
                let _ = panic::catch_unwind(AssertUnwindSafe(|| sink.close()));
                self.observe(|o| o.on_unsubscribed(id));
                true
            }
            None => false,
        }
    }

    fn close_all(&self) {
        for (id, sink) in self.registry.drain() {
            let _ = panic::catch_unwind(AssertUnwindSafe(|| sink.close()));
            self.observe(|o| o.on_unsubscribed(id));
        }
    }

    /// Runs an observer hook, swallowing panics.
    fn observe(&self, f: impl FnOnce(&dyn Observer)) {
        let _ = panic::catch_unwind(AssertUnwindSafe(|| f(self.observer.as_ref())));
    }
}

impl Drop for BusCore {
    fn drop(&mut self) {
        self.close_all();
    }
}

/// In-process notification bus.
///
/// ### Properties
/// - **Non-blocking**: `publish()` returns after one bounded enqueue per subscription.
/// - **Fire-and-forget**: no delivery or durability guarantees.
/// - **Cloneable**: cheap to clone (internally an `Arc`).
#[derive(Clone)]
pub struct EventBus {
    core: Arc<BusCore>,
}

impl EventBus {
    /// Creates a bus with the default observer.
    pub fn new(cfg: BusConfig) -> Self {
        BusBuilder::new(cfg).build()
    }

    /// Returns a builder for wiring a custom observer.
    pub fn builder(cfg: BusConfig) -> BusBuilder {
        BusBuilder::new(cfg)
    }

    pub(crate) fn from_parts(cfg: BusConfig, observer: Arc<dyn Observer>) -> Self {
        Self {
            core: Arc::new(BusCore {
                cfg,
                registry: Registry::new(),
                stats: BusStats::default(),
                observer,
            }),
        }
    }

    /// Configuration this bus was built with.
    pub fn config(&self) -> &BusConfig {
        &self.core.cfg
    }

    /// Publishes an event to every active subscription.
    ///
    /// - Never waits for a consumer and never fails.
    /// - Full queues evict their oldest pending event.
    /// - Delivery failures are reported to the observer and suppressed.
    ///
    /// Returns how many subscriptions accepted the event (informational).
    pub fn publish(&self, event: Event) -> usize {
        let core = &self.core;
        let mut delivered = 0usize;

        for (id, entry) in core.registry.snapshot() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| entry.sink.deliver(&event)))
                .unwrap_or_else(|payload| {
                    Err(DeliveryError::from_panic(entry.name, payload.as_ref()))
                });

            match outcome {
                Ok(Delivery::Enqueued) => delivered += 1,
                Ok(Delivery::Evicted(old)) => {
                    delivered += 1;
                    core.stats.record_drop();
                    core.observe(|o| o.on_overflow(id, &old));
                }
                Err(err) if !err.is_reportable() => {}
                Err(err) => {
                    core.stats.record_failure();
                    core.observe(|o| o.on_delivery_failure(id, &event, "publish", &err));
                }
            }
        }

        core.stats.record_publish(delivered);
        core.observe(|o| o.on_published(&event, delivered));
        delivered
    }

    /// Publishes a borrowed event by cloning it.
    ///
    /// Shorthand for `publish(ev.clone())`.
    pub fn publish_ref(&self, event: &Event) -> usize {
        self.publish(event.clone())
    }

    /// Registers a subscription with the configured default capacity.
    ///
    /// The subscription only sees events published after this call.
    pub fn subscribe(&self) -> Subscription {
        self.subscribe_with_capacity(self.core.cfg.queue_capacity_clamped())
    }

    /// Registers a subscription with an explicit queue capacity (minimum 1).
    pub fn subscribe_with_capacity(&self, capacity: usize) -> Subscription {
        let mailbox = Arc::new(Mailbox::new(capacity));
        let sink: Arc<dyn Deliver> = mailbox.clone();
        let id = self.core.registry.insert("mailbox", sink);
        self.core.observe(|o| o.on_subscribed(id, "mailbox"));
        Subscription::new(id, mailbox, Arc::downgrade(&self.core))
    }

    /// Registers a custom delivery sink in the fan-out set.
    ///
    /// The sink stays registered until [`unsubscribe`](Self::unsubscribe) is called
    /// with the returned id, or the bus is dropped.
    pub fn attach(&self, sink: Arc<dyn Deliver>) -> SubscriptionId {
        let name = panic::catch_unwind(AssertUnwindSafe(|| sink.name())).unwrap_or("unnamed");
        let id = self.core.registry.insert(name, sink);
        self.core.observe(|o| o.on_subscribed(id, name));
        id
    }

    /// Removes a registration from the fan-out set and cancels it.
    ///
    /// Idempotent: returns `true` only for the call that removed it.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.core.remove(id)
    }

    /// Cancels every registration. Subscriptions created afterwards work normally.
    pub fn shutdown(&self) {
        self.core.close_all();
    }

    /// Number of active registrations.
    pub fn subscriber_count(&self) -> usize {
        self.core.registry.len()
    }

    /// Current counters.
    pub fn stats(&self) -> BusStatsSnapshot {
        self.core.stats.snapshot()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(BusConfig::default())
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("cfg", &self.core.cfg)
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::TransactionKind;
    use crate::observers::NoopObserver;
    use futures::StreamExt;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    fn quiet_bus(capacity: usize) -> EventBus {
        EventBus::builder(BusConfig::with_queue_capacity(capacity))
            .with_observer(Arc::new(NoopObserver))
            .build()
    }

    fn tx(id: i64) -> Event {
        Event::new_transaction(id, id as f64 * 10.0, TransactionKind::Debit)
    }

    fn drain(sub: &Subscription) -> Vec<i64> {
        std::iter::from_fn(|| sub.try_recv()).map(|e| e.id()).collect()
    }

    #[derive(Default)]
    struct Recorder {
        lines: Mutex<Vec<String>>,
    }

    impl Recorder {
        fn lines(&self) -> Vec<String> {
            self.lines.lock().unwrap().clone()
        }
    }

    impl Observer for Recorder {
        fn on_published(&self, event: &Event, delivered: usize) {
            self.lines
                .lock()
                .unwrap()
                .push(format!("published {} delivered={delivered}", event.id()));
        }
        fn on_overflow(&self, sub: SubscriptionId, evicted: &Event) {
            self.lines
                .lock()
                .unwrap()
                .push(format!("overflow {sub} evicted={}", evicted.id()));
        }
        fn on_delivery_failure(
            &self,
            sub: SubscriptionId,
            event: &Event,
            op: &'static str,
            err: &DeliveryError,
        ) {
            self.lines.lock().unwrap().push(format!(
                "failure {sub} op={op} event={} err={}",
                event.id(),
                err.as_label()
            ));
        }
        fn on_unsubscribed(&self, sub: SubscriptionId) {
            self.lines.lock().unwrap().push(format!("unsubscribed {sub}"));
        }
    }

    struct FailingSink;

    impl Deliver for FailingSink {
        fn deliver(&self, _event: &Event) -> Result<Delivery, DeliveryError> {
            Err(DeliveryError::Sink {
                sink: "failing",
                reason: "offline".into(),
            })
        }
        fn name(&self) -> &'static str {
            "failing"
        }
    }

    struct PanickingSink;

    impl Deliver for PanickingSink {
        fn deliver(&self, _event: &Event) -> Result<Delivery, DeliveryError> {
            panic!("sink exploded")
        }
        fn name(&self) -> &'static str {
            "panicking"
        }
    }

    /// Panics in `deliver`, and in `name` on every call after registration.
    #[derive(Default)]
    struct RenamingPanicSink {
        named: std::sync::atomic::AtomicBool,
    }

    impl Deliver for RenamingPanicSink {
        fn deliver(&self, _event: &Event) -> Result<Delivery, DeliveryError> {
            panic!("sink exploded")
        }
        fn name(&self) -> &'static str {
            if self.named.swap(true, std::sync::atomic::Ordering::SeqCst) {
                panic!("name exploded")
            }
            "renaming"
        }
    }

    #[tokio::test]
    async fn test_capacity_covers_all_publishes() {
        let bus = quiet_bus(16);
        let sub = bus.subscribe();
        for id in 1..=16 {
            bus.publish(tx(id));
        }
        for id in 1..=16 {
            assert_eq!(sub.recv().await.map(|e| e.id()), Some(id));
        }
        assert_eq!(sub.dropped(), 0);
    }

    #[test]
    fn test_small_capacity_keeps_last_events() {
        let bus = quiet_bus(3);
        let sub = bus.subscribe();
        for id in 1..=10 {
            bus.publish(tx(id));
        }
        assert_eq!(sub.len(), 3);
        assert_eq!(drain(&sub), vec![8, 9, 10]);
        assert_eq!(sub.dropped(), 7);
        assert_eq!(bus.stats().dropped, 7);
    }

    #[tokio::test]
    async fn test_capacity_two_keeps_b_and_c() {
        let bus = quiet_bus(10);
        let sub = bus.subscribe_with_capacity(2);
        bus.publish(Event::deleted(1)); // A
        bus.publish(Event::deleted(2)); // B
        bus.publish(Event::deleted(3)); // C

        let got: Vec<i64> = sub.into_stream().take(2).map(|e| e.id()).collect().await;
        assert_eq!(got, vec![2, 3]);
    }

    #[test]
    fn test_late_subscriber_sees_no_history() {
        let bus = quiet_bus(10);
        let s1 = bus.subscribe();
        bus.publish(tx(1)); // A
        let s2 = bus.subscribe();
        bus.publish(tx(2)); // B

        assert_eq!(drain(&s1), vec![1, 2]);
        assert_eq!(drain(&s2), vec![2]);
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = quiet_bus(10);
        assert_eq!(bus.publish(tx(1)), 0);
        let sub = bus.subscribe();
        assert!(sub.try_recv().is_none());
        assert_eq!(bus.stats().published, 1);
    }

    #[test]
    fn test_publish_never_blocks_on_idle_consumer() {
        let bus = quiet_bus(1);
        let sub = bus.subscribe();
        for id in 0..10_000 {
            assert_eq!(bus.publish(tx(id)), 1);
        }
        assert_eq!(sub.len(), 1);
        assert_eq!(sub.dropped(), 9_999);
        assert_eq!(drain(&sub), vec![9_999]);
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_delivery() {
        let bus = quiet_bus(4);
        let sub = bus.subscribe();
        bus.publish(tx(1));

        assert!(bus.unsubscribe(sub.id()));
        assert!(!bus.unsubscribe(sub.id()));
        assert!(sub.is_cancelled());

        assert_eq!(bus.publish(tx(2)), 0);
        assert_eq!(sub.len(), 0);
        assert_eq!(sub.recv().await, None);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_handle_unsubscribe_is_idempotent() {
        let rec = Arc::new(Recorder::default());
        let bus = EventBus::builder(BusConfig::default())
            .with_observer(rec.clone())
            .build();
        let sub = bus.subscribe();
        let id = sub.id();

        sub.unsubscribe();
        sub.unsubscribe();
        drop(sub);

        let unsubs = rec
            .lines()
            .into_iter()
            .filter(|l| l == &format!("unsubscribed {id}"))
            .count();
        assert_eq!(unsubs, 1);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let bus = quiet_bus(4);
        let sub = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);
        drop(sub);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_failing_sink_does_not_affect_others() {
        let rec = Arc::new(Recorder::default());
        let bus = EventBus::builder(BusConfig::default())
            .with_observer(rec.clone())
            .build();

        let before = bus.subscribe();
        let bad = bus.attach(Arc::new(FailingSink));
        let after = bus.subscribe();

        assert_eq!(bus.publish(tx(7)), 2);

        assert_eq!(drain(&before), vec![7]);
        assert_eq!(drain(&after), vec![7]);
        assert_eq!(bus.stats().failures, 1);
        assert!(
            rec.lines()
                .contains(&format!("failure {bad} op=publish event=7 err=delivery_sink"))
        );
    }

    #[test]
    fn test_panicking_sink_is_contained() {
        let rec = Arc::new(Recorder::default());
        let bus = EventBus::builder(BusConfig::default())
            .with_observer(rec.clone())
            .build();

        let bad = bus.attach(Arc::new(PanickingSink));
        let good = bus.subscribe();

        bus.publish(tx(1));
        bus.publish(tx(2));

        assert_eq!(drain(&good), vec![1, 2]);
        assert_eq!(bus.stats().failures, 2);
        assert!(
            rec.lines()
                .contains(&format!("failure {bad} op=publish event=1 err=delivery_panicked"))
        );
    }

    #[test]
    fn test_sink_panicking_in_name_is_contained() {
        let rec = Arc::new(Recorder::default());
        let bus = EventBus::builder(BusConfig::default())
            .with_observer(rec.clone())
            .build();

        let bad = bus.attach(Arc::new(RenamingPanicSink::default()));
        let good = bus.subscribe();

        let res = std::panic::catch_unwind(AssertUnwindSafe(|| bus.publish(tx(4))));
        assert_eq!(res.ok(), Some(1));

        assert_eq!(drain(&good), vec![4]);
        assert_eq!(bus.stats().published, 1);
        assert_eq!(bus.stats().failures, 1);
        assert!(
            rec.lines()
                .contains(&format!("failure {bad} op=publish event=4 err=delivery_panicked"))
        );
        assert!(rec.lines().contains(&"published 4 delivered=1".to_string()));
    }

    #[test]
    fn test_huge_capacity_subscribes_and_still_drops_oldest() {
        let bus = quiet_bus(10);
        let unbounded = bus.subscribe_with_capacity(usize::MAX);
        assert_eq!(unbounded.capacity(), usize::MAX);

        let tiny = bus.subscribe_with_capacity(2);
        for id in 1..=5 {
            bus.publish(tx(id));
        }

        assert_eq!(drain(&unbounded), vec![1, 2, 3, 4, 5]);
        assert_eq!(unbounded.dropped(), 0);
        assert_eq!(drain(&tiny), vec![4, 5]);
        assert_eq!(tiny.dropped(), 3);
    }

    #[test]
    fn test_panicking_observer_is_ignored() {
        struct Exploding;
        impl Observer for Exploding {
            fn on_published(&self, _event: &Event, _delivered: usize) {
                panic!("observer exploded")
            }
        }

        let bus = EventBus::builder(BusConfig::default())
            .with_observer(Arc::new(Exploding))
            .build();
        let sub = bus.subscribe();
        assert_eq!(bus.publish(tx(1)), 1);
        assert_eq!(drain(&sub), vec![1]);
    }

    #[test]
    fn test_overflow_reported_to_observer() {
        let rec = Arc::new(Recorder::default());
        let bus = EventBus::builder(BusConfig::with_queue_capacity(1))
            .with_observer(rec.clone())
            .build();
        let sub = bus.subscribe();

        bus.publish(tx(1));
        bus.publish(tx(2));

        let id = sub.id();
        assert_eq!(
            rec.lines(),
            vec![
                "published 1 delivered=1".to_string(),
                format!("overflow {id} evicted=1"),
                "published 2 delivered=1".to_string(),
            ]
        );
    }

    #[test]
    fn test_stats_counters() {
        let bus = quiet_bus(2);
        let _a = bus.subscribe();
        let _b = bus.subscribe();
        for id in 0..3 {
            bus.publish(tx(id));
        }
        assert_eq!(
            bus.stats(),
            BusStatsSnapshot {
                published: 3,
                delivered: 6,
                dropped: 2,
                failures: 0,
            }
        );
    }

    #[tokio::test]
    async fn test_recv_waits_for_publish() {
        let bus = quiet_bus(4);
        let sub = bus.subscribe();
        let producer = bus.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            producer.publish(tx(42));
        });

        assert_eq!(sub.recv().await.map(|e| e.id()), Some(42));
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_timeout_race_loses_nothing() {
        let bus = quiet_bus(4);
        let sub = bus.subscribe();

        let res = tokio::time::timeout(Duration::from_millis(10), sub.recv()).await;
        assert!(res.is_err());
        assert!(!sub.is_cancelled());

        bus.publish(tx(5));
        let res = tokio::time::timeout(Duration::from_secs(1), sub.recv()).await;
        assert_eq!(res.unwrap().map(|e| e.id()), Some(5));
    }

    #[tokio::test]
    async fn test_recv_until_cancels_subscription() {
        let bus = quiet_bus(4);
        let sub = bus.subscribe();
        let token = CancellationToken::new();

        let child = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            child.cancel();
        });

        assert_eq!(sub.recv_until(&token).await, None);
        assert!(sub.is_cancelled());
        assert_eq!(bus.subscriber_count(), 0);
        assert_eq!(bus.publish(tx(1)), 0);
    }

    #[tokio::test]
    async fn test_recv_until_returns_event() {
        let bus = quiet_bus(4);
        let sub = bus.subscribe();
        let token = CancellationToken::new();

        bus.publish(tx(3));
        assert_eq!(sub.recv_until(&token).await.map(|e| e.id()), Some(3));
        assert!(!sub.is_cancelled());
    }

    #[tokio::test]
    async fn test_stream_ends_on_unsubscribe() {
        let bus = quiet_bus(8);
        let sub = bus.subscribe();
        let id = sub.id();

        bus.publish(tx(1));
        bus.publish(tx(2));

        let mut stream = Box::pin(sub.into_stream());
        assert_eq!(stream.next().await.map(|e| e.id()), Some(1));

        bus.unsubscribe(id);
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_dropping_last_bus_clone_cancels_subscriptions() {
        let bus = quiet_bus(4);
        let sub = bus.subscribe();
        drop(bus);

        assert!(sub.is_cancelled());
        assert_eq!(sub.recv().await, None);
    }

    #[test]
    fn test_shutdown_cancels_everything() {
        let bus = quiet_bus(4);
        let a = bus.subscribe();
        let b = bus.subscribe();
        bus.shutdown();

        assert!(a.is_cancelled());
        assert!(b.is_cancelled());
        assert_eq!(bus.subscriber_count(), 0);

        let c = bus.subscribe();
        bus.publish(tx(1));
        assert_eq!(drain(&c), vec![1]);
    }

    #[test]
    fn test_concurrent_publishers_keep_per_producer_order() {
        const PRODUCERS: i64 = 4;
        const PER_PRODUCER: i64 = 250;

        let bus = quiet_bus((PRODUCERS * PER_PRODUCER) as usize);
        let sub = bus.subscribe();

        std::thread::scope(|s| {
            for p in 0..PRODUCERS {
                let bus = bus.clone();
                s.spawn(move || {
                    for n in 0..PER_PRODUCER {
                        bus.publish(tx(p * 1_000 + n));
                    }
                });
            }
        });

        let got = drain(&sub);
        assert_eq!(got.len(), (PRODUCERS * PER_PRODUCER) as usize);
        for p in 0..PRODUCERS {
            let mine: Vec<i64> = got.iter().copied().filter(|id| id / 1_000 == p).collect();
            let expected: Vec<i64> = (0..PER_PRODUCER).map(|n| p * 1_000 + n).collect();
            assert_eq!(mine, expected, "producer {p} order");
        }
    }

    #[test]
    fn test_concurrent_unsubscribe_and_publish() {
        let bus = quiet_bus(4);
        let subs: Vec<_> = (0..16).map(|_| bus.subscribe()).collect();
        let watched = bus.subscribe();

        std::thread::scope(|s| {
            let publisher = bus.clone();
            s.spawn(move || {
                for id in 0..1_000 {
                    publisher.publish(tx(id));
                }
            });
            let watched = &watched;
            s.spawn(move || {
                watched.unsubscribe();
                for sub in subs {
                    sub.unsubscribe();
                    assert_eq!(watched.len(), 0);
                }
                for _ in 0..1_000 {
                    assert_eq!(watched.len(), 0);
                    assert!(watched.try_recv().is_none());
                }
            });
        });

        assert!(watched.is_cancelled());
        assert_eq!(watched.len(), 0);
        assert_eq!(bus.subscriber_count(), 0);
        assert_eq!(bus.publish(tx(9)), 0);
        assert_eq!(watched.len(), 0);
    }
}
