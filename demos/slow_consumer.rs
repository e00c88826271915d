//! # Slow Consumer Example
//!
//! Shows drop-oldest overflow: a consumer with a 3-slot queue falls behind a fast
//! producer. The producer never waits; the consumer only sees the most recent events.
//!
//! ## Run
//! ```bash
//! cargo run --example slow_consumer
//! ```

use std::time::Duration;

use notibus::{BusConfig, Event, EventBus, NoopObserver, TransactionKind};

#[tokio::main]
async fn main() {
    let bus = EventBus::builder(BusConfig::with_queue_capacity(3))
        .with_observer(std::sync::Arc::new(NoopObserver))
        .build();

    let slow = bus.subscribe();

    for id in 0..20 {
        bus.publish(Event::new_transaction(id, 1.0, TransactionKind::Credit));
    }
    println!("published 20 events without waiting");

    while let Ok(Some(ev)) = tokio::time::timeout(Duration::from_millis(100), slow.recv()).await {
        println!("[slow] got id={}", ev.id());
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    println!("dropped for slow consumer: {}", slow.dropped());
    println!("bus stats: {:?}", bus.stats());
}
