//! Edge Machine job event bus.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`, usable as the job core's event sink.
//! - [`PlatformEvent`]: the envelope published for each job lifecycle event.
//! - [`EventLogger`]: background subscriber writing every event to the log.

pub mod bus;
pub mod logger;

pub use bus::{EventBus, PlatformEvent};
pub use logger::EventLogger;
