use std::sync::Arc;

use crate::bus::{BusConfig, EventBus};
use crate::observers::Observer;

/// Builder for constructing an [`EventBus`] with a custom observer.
///
/// ```
/// use std::sync::Arc;
/// use notibus::{BusBuilder, BusConfig, NoopObserver};
///
/// let bus = BusBuilder::new(BusConfig::with_queue_capacity(32))
///     .with_observer(Arc::new(NoopObserver))
///     .build();
///
/// assert_eq!(bus.config().queue_capacity, 32);
/// ```
pub struct BusBuilder {
    cfg: BusConfig,
    observer: Option<Arc<dyn Observer>>,
}

impl BusBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: BusConfig) -> Self {
        Self {
            cfg,
            observer: None,
        }
    }

    /// Sets the diagnostics observer.
    ///
    /// Without one, the bus uses [`LogWriter`](crate::LogWriter) when the `logging`
    /// feature is enabled and [`NoopObserver`](crate::NoopObserver) otherwise.
    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Builds the bus.
    pub fn build(self) -> EventBus {
        let observer = self.observer.unwrap_or_else(default_observer);
        EventBus::from_parts(self.cfg, observer)
    }
}

#[cfg(feature = "logging")]
fn default_observer() -> Arc<dyn Observer> {
    Arc::new(crate::observers::LogWriter::new())
}

#[cfg(not(feature = "logging"))]
fn default_observer() -> Arc<dyn Observer> {
    Arc::new(crate::observers::NoopObserver)
}
