//! Job dispatch and execution core.
//!
//! - [`registry::JobRegistry`] maps job names to [`definition::JobDefinition`]s.
//! - [`tracker::JobExecutionTracker`] records executions and enforces that a
//!   job name has at most one pending or running execution at a time.
//! - [`runner::JobRunner`] runs job bodies on spawned tasks and records
//!   exactly one terminal status per execution.
//! - [`gateway::AdminGateway`] authenticates admin requests and ties the
//!   pieces together.
//! - [`sink::JobEventSink`] receives structured lifecycle events.

pub mod definition;
pub mod execution;
pub mod gateway;
pub mod registry;
pub mod runner;
pub mod sink;
pub mod tracker;

pub use definition::{Job, JobDefinition, JobOutput};
pub use execution::{ExecutionStatus, JobExecution};
pub use gateway::{AdminGateway, JobOverview, RunOutcome};
pub use registry::{JobRegistry, JobRegistryBuilder};
pub use runner::JobRunner;
pub use sink::{JobEvent, JobEventSink};
pub use tracker::{BeginOutcome, JobExecutionTracker, DEFAULT_HISTORY_LIMIT};
