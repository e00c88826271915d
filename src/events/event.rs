//! # Domain events published through the bus.
//!
//! [`Event`] is an immutable tagged union. Each variant identifies **what happened**
//! (a transaction was detected, a transaction was deleted) and when it was emitted.
//! It never carries the authoritative record: consumers react by re-querying their
//! own state.
//!
//! New kinds of events are added as new variants; existing variants are never
//! reshaped. The enum is `#[non_exhaustive]` so downstream matches keep compiling.
//!
//! ## Example
//! ```rust
//! use notibus::{Event, TransactionKind};
//!
//! let ev = Event::new_transaction(42, 19.99, TransactionKind::Debit);
//!
//! assert_eq!(ev.id(), 42);
//! assert_eq!(ev.as_label(), "new_transaction");
//! assert!(ev.is_new_transaction());
//! ```

use std::fmt;
use std::time::SystemTime;

/// Direction of a detected transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransactionKind {
    /// Money left the account.
    Debit,
    /// Money entered the account.
    Credit,
    /// The producer could not classify the transaction.
    #[default]
    Unknown,
}

impl TransactionKind {
    /// Parses a producer-supplied label (`"debit"` / `"credit"`, case-insensitive).
    ///
    /// Anything else maps to [`TransactionKind::Unknown`].
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        if label.eq_ignore_ascii_case("debit") {
            TransactionKind::Debit
        } else if label.eq_ignore_ascii_case("credit") {
            TransactionKind::Credit
        } else {
            TransactionKind::Unknown
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TransactionKind::Debit => "debit",
            TransactionKind::Credit => "credit",
            TransactionKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Domain event accepted by the [`EventBus`](crate::EventBus).
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A new transaction was detected and persisted by a producer.
    NewTransaction {
        /// Identifier of the persisted transaction.
        id: i64,
        /// Signed or unsigned amount as parsed by the producer.
        amount: f64,
        /// Debit / credit classification.
        kind: TransactionKind,
        /// Wall-clock time the event was created.
        emitted_at: SystemTime,
    },

    /// A transaction was deleted.
    Deleted {
        /// Identifier of the deleted transaction.
        id: i64,
        /// Wall-clock time the event was created.
        emitted_at: SystemTime,
    },
}

impl Event {
    /// Creates a [`Event::NewTransaction`] stamped with the current time.
    #[inline]
    pub fn new_transaction(id: i64, amount: f64, kind: TransactionKind) -> Self {
        Event::NewTransaction {
            id,
            amount,
            kind,
            emitted_at: SystemTime::now(),
        }
    }

    /// Creates a [`Event::Deleted`] stamped with the current time.
    #[inline]
    pub fn deleted(id: i64) -> Self {
        Event::Deleted {
            id,
            emitted_at: SystemTime::now(),
        }
    }

    /// Identifier of the transaction this event refers to.
    #[inline]
    pub fn id(&self) -> i64 {
        match self {
            Event::NewTransaction { id, .. } | Event::Deleted { id, .. } => *id,
        }
    }

    /// Wall-clock time the event was emitted.
    #[inline]
    pub fn emitted_at(&self) -> SystemTime {
        match self {
            Event::NewTransaction { emitted_at, .. } | Event::Deleted { emitted_at, .. } => {
                *emitted_at
            }
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            Event::NewTransaction { .. } => "new_transaction",
            Event::Deleted { .. } => "deleted",
        }
    }

    /// Returns a compact, human-readable description used by diagnostics.
    ///
    /// Amounts are included; nothing beyond the event payload is looked up.
    pub fn summary(&self) -> String {
        match self {
            Event::NewTransaction {
                id, amount, kind, ..
            } => format!("new_transaction id={id} amount={amount} kind={kind}"),
            Event::Deleted { id, .. } => format!("deleted id={id}"),
        }
    }

    /// Returns `true` for [`Event::NewTransaction`].
    #[inline]
    pub fn is_new_transaction(&self) -> bool {
        matches!(self, Event::NewTransaction { .. })
    }

    /// Returns `true` for [`Event::Deleted`].
    #[inline]
    pub fn is_deleted(&self) -> bool {
        matches!(self, Event::Deleted { .. })
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}
