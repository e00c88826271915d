//! Domain events carried by the bus.
//!
//! ## Contents
//! - [`Event`] tagged union of everything the bus can announce
//! - [`TransactionKind`] debit / credit classification
//!
//! Producers build events with [`Event::new_transaction`] / [`Event::deleted`] and
//! hand them to [`EventBus::publish`](crate::EventBus::publish).

mod event;

pub use event::{Event, TransactionKind};
