use std::sync::Arc;

use edge_core::jobs::AdminGateway;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: edge_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Admin entry point for running and inspecting jobs.
    pub gateway: Arc<AdminGateway>,
}
