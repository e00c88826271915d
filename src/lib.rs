//! # notibus
//!
//! **notibus** is an in-process event notification bus.
//!
//! It decouples background producers (parsers, sync jobs, importers) that detect new
//! domain events from any number of consumers (UI views, business logic) that react
//! by re-querying authoritative state. Producers never block or fail because a
//! consumer is slow, absent or broken; consumers see events live while subscribed
//! and get no history when they subscribe late.
//!
//! ## Architecture
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  producer 1  │   │  producer 2  │   │  producer N  │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            │ publish(Event)   │                  │
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  EventBus (cloneable, one per process, wired at startup)          │
//! │  - Registry   (active subscriptions, snapshot per publish)        │
//! │  - Observer   (injected diagnostics: publish/overflow/failure)    │
//! │  - Stats      (published, delivered, dropped, failures)           │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!  ┌───────────┐      ┌───────────┐      ┌────────────┐
//!  │ mailbox 0 │      │ mailbox 1 │      │ custom sink│
//!  │ (bounded, │      │ (bounded, │      │ (attach)   │
//!  │ drop-old) │      │ drop-old) │      └────────────┘
//!  └─────┬─────┘      └─────┬─────┘
//!        ▼                  ▼
//!  Subscription::recv  Subscription::into_stream
//! ```
//!
//! ### Subscription lifecycle
//! ```text
//! subscribe() ──► Active ──► recv()/try_recv()/stream ...
//!                   │
//!                   └─(unsubscribe | drop | token fired | bus dropped)──► Cancelled
//! ```
//!
//! ## Features
//! | Area              | Description                                             | Key types                                 |
//! |-------------------|---------------------------------------------------------|-------------------------------------------|
//! | **Events**        | Tagged union of domain events.                          | [`Event`], [`TransactionKind`]            |
//! | **Bus**           | Non-blocking fan-out with bounded drop-oldest queues.   | [`EventBus`], [`BusBuilder`]              |
//! | **Consumers**     | Cancellable async receive and `Stream` adapter.         | [`Subscription`]                          |
//! | **Extension**     | Custom fan-out targets.                                 | [`Deliver`], [`Delivery`]                 |
//! | **Diagnostics**   | Injected hook for logs/metrics.                         | [`Observer`], [`NoopObserver`]            |
//! | **Errors**        | Suppressed delivery failures.                           | [`DeliveryError`]                         |
//! | **Configuration** | Per-subscription queue capacity.                        | [`BusConfig`]                             |
//!
//! ## Optional features
//! - `logging` (default): exports [`LogWriter`], a `tracing`-backed observer, and uses
//!   it as the default observer.
//!
//! ## Example
//! ```rust
//! use notibus::{BusConfig, Event, EventBus, TransactionKind};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let bus = EventBus::new(BusConfig::default());
//!
//!     // Consumer: subscribe before the producer publishes.
//!     let sub = bus.subscribe();
//!
//!     // Producer: never waits for the consumer.
//!     let producer = bus.clone();
//!     producer.publish(Event::new_transaction(1, 25.0, TransactionKind::Debit));
//!     producer.publish(Event::deleted(1));
//!
//!     assert!(sub.recv().await.unwrap().is_new_transaction());
//!     assert!(sub.recv().await.unwrap().is_deleted());
//! }
//! ```
mod bus;
mod error;
mod events;
mod observers;
mod subscription;

// ---- Public re-exports ----

pub use bus::{BusBuilder, BusConfig, BusStatsSnapshot, EventBus};
pub use error::DeliveryError;
pub use events::{Event, TransactionKind};
pub use observers::{NoopObserver, Observer};
pub use subscription::{Deliver, Delivery, Subscription, SubscriptionId};

// Optional: built-in tracing observer.
// Enabled by default; disable with `default-features = false`.
#[cfg(feature = "logging")]
pub use observers::LogWriter;
