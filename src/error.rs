//! Error types used by the bus.
//!
//! [`DeliveryError`] describes why a single fan-out step could not enqueue an event
//! into one subscription. It never escapes [`EventBus::publish`](crate::EventBus::publish):
//! the bus reports it to the [`Observer`](crate::Observer) and moves on.
//!
//! Queue-full eviction is **not** an error (see [`Observer::on_overflow`](crate::Observer::on_overflow)).

use thiserror::Error;

/// # Errors produced while delivering an event to one subscription.
///
/// These are recovered locally by the bus. Producers never see them.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// The target subscription has already been cancelled.
    ///
    /// Treated as a silent no-op by the bus.
    #[error("subscription closed")]
    Closed,

    /// An internal lock was poisoned by a panicking thread.
    #[error("lock poisoned: {what}")]
    Poisoned {
        /// Which structure was poisoned (e.g. "mailbox", "registry").
        what: &'static str,
    },

    /// A custom sink rejected the event.
    #[error("sink {sink} rejected event: {reason}")]
    Sink {
        /// Name of the sink.
        sink: &'static str,
        /// Sink-provided reason.
        reason: String,
    },

    /// A sink panicked while accepting the event.
    #[error("sink {sink} panicked: {info}")]
    Panicked {
        /// Name of the sink.
        sink: &'static str,
        /// Panic payload, if it was a string.
        info: String,
    },
}

impl DeliveryError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use notibus::DeliveryError;
    ///
    /// let err = DeliveryError::Poisoned { what: "mailbox" };
    /// assert_eq!(err.as_label(), "delivery_poisoned");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DeliveryError::Closed => "delivery_closed",
            DeliveryError::Poisoned { .. } => "delivery_poisoned",
            DeliveryError::Sink { .. } => "delivery_sink",
            DeliveryError::Panicked { .. } => "delivery_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            DeliveryError::Closed => "subscription closed".to_string(),
            DeliveryError::Poisoned { what } => format!("poisoned: {what}"),
            DeliveryError::Sink { sink, reason } => format!("sink={sink} reason: {reason}"),
            DeliveryError::Panicked { sink, info } => format!("sink={sink} panic: {info}"),
        }
    }

    /// Indicates whether the failure should be reported to diagnostics.
    ///
    /// Returns `false` only for [`DeliveryError::Closed`], which is the expected
    /// outcome of racing `publish` with `unsubscribe`.
    pub fn is_reportable(&self) -> bool {
        !matches!(self, DeliveryError::Closed)
    }

    /// Builds a [`DeliveryError::Panicked`] from a caught panic payload.
    pub(crate) fn from_panic(sink: &'static str, payload: &(dyn std::any::Any + Send)) -> Self {
        let info = if let Some(msg) = payload.downcast_ref::<&'static str>() {
            (*msg).to_string()
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            msg.clone()
        } else {
            "unknown panic".to_string()
        };
        DeliveryError::Panicked { sink, info }
    }
}
