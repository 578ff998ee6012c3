//! The Edge Machine's data pipeline jobs.
//!
//! Each job is a [`Job`](edge_core::jobs::Job) implementation capturing the
//! pool and clients it needs. [`build_registry`] wires all four into a
//! [`JobRegistry`](edge_core::jobs::JobRegistry) under their public names.

pub mod discover;
pub mod forecast;
pub mod registry;
pub mod snapshot;
pub mod update;

pub use discover::DiscoverMarkets;
pub use forecast::ForecastMachine;
pub use registry::{build_registry, JOB_NAMES};
pub use snapshot::SnapshotPm;
pub use update::UpdatePrices;
