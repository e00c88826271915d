//! The event bus: fan-out, registry, configuration and counters.
//!
//! ## Contents
//! - [`EventBus`] cloneable handle: `publish` / `subscribe` / `unsubscribe`
//! - [`BusBuilder`] wires a custom [`Observer`](crate::Observer)
//! - [`BusConfig`] per-subscription queue capacity
//! - [`BusStatsSnapshot`] publish / delivery / drop / failure counters

mod builder;
#[allow(clippy::module_inception)]
mod bus;
mod config;
mod registry;
mod stats;

pub use builder::BusBuilder;
pub(crate) use bus::BusCore;
pub use bus::EventBus;
pub use config::BusConfig;
pub use stats::BusStatsSnapshot;
