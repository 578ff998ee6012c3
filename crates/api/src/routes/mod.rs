pub mod events;
pub mod health;
pub mod jobs;

use axum::Router;

use crate::state::AppState;

/// Build the `/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /events                          list events (public)
///
/// /admin/events                    create event (POST)
///
/// /admin/jobs                      list registered jobs
/// /admin/jobs/run?job_name=        start a job (POST)
/// /admin/jobs/status?job_name=     latest execution
/// /admin/jobs/history?job_name=    earlier executions
/// ```
///
/// Every `/admin` route requires the `x-admin-token` header.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(events::router())
        .nest("/admin/jobs", jobs::router())
}
