//! # Ledger Feed Example
//!
//! One background producer detects transactions and publishes them; two consumers
//! react independently:
//! - a "balance view" that refreshes on every event
//! - an "audit" consumer that stops after a deadline via `CancellationToken`
//!
//! ## Run
//! ```bash
//! RUST_LOG=notibus=debug cargo run --example ledger_feed
//! ```

use std::time::Duration;

use notibus::{BusConfig, Event, EventBus, TransactionKind};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // One bus for the whole process, cloned into every component.
    let bus = EventBus::new(BusConfig::default());

    let view = bus.subscribe();
    let balance = tokio::spawn(async move {
        let mut refreshes = 0u32;
        while let Some(ev) = view.recv().await {
            refreshes += 1;
            println!("[view] refresh #{refreshes} after {ev}");
        }
        refreshes
    });

    let audit = bus.subscribe();
    let stop = CancellationToken::new();
    let audit_stop = stop.clone();
    let auditor = tokio::spawn(async move {
        let mut seen = Vec::new();
        while let Some(ev) = audit.recv_until(&audit_stop).await {
            seen.push(ev.id());
        }
        seen
    });

    let producer = bus.clone();
    let feed = tokio::spawn(async move {
        let incoming = [
            ("debit", 12.40),
            ("credit", 1500.00),
            ("debit", 3.99),
            ("refund", 20.00),
        ];
        for (id, (label, amount)) in incoming.iter().enumerate() {
            let kind = TransactionKind::from_label(label);
            producer.publish(Event::new_transaction(id as i64, *amount, kind));
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        producer.publish(Event::deleted(3));
    });

    feed.await.expect("producer task");
    stop.cancel();
    let seen = auditor.await.expect("audit task");

    bus.shutdown();
    let refreshes = balance.await.expect("view task");

    println!();
    println!("Summary:");
    println!(" ├─► View refreshes: {refreshes}");
    println!(" ├─► Audited ids:    {seen:?}");
    println!(" └─► Bus stats:      {:?}", bus.stats());
}
