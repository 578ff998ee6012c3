//! Edge Machine domain logic.
//!
//! Pure building blocks shared by the API server and the job pipeline:
//! error types, admin token verification, forecasting math, and the job
//! dispatch core (registry, execution tracker, runner, admin gateway).
//! Nothing in this crate touches the database or the network.

pub mod admin_token;
pub mod error;
pub mod forecast;
pub mod jobs;
pub mod types;
