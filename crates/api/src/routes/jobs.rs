use axum::routing::{get, post};
use axum::Router;

use crate::handlers::jobs;
use crate::state::AppState;

/// Routes mounted at `/v1/admin/jobs`.
///
/// ```text
/// GET  /
/// POST /run
/// GET  /status
/// GET  /history
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(jobs::list_jobs))
        .route("/run", post(jobs::run_job))
        .route("/status", get(jobs::job_status))
        .route("/history", get(jobs::job_history))
}
