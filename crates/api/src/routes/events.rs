use axum::routing::{get, post};
use axum::Router;

use crate::handlers::events;
use crate::state::AppState;

/// Routes mounted at the `/v1` root.
///
/// ```text
/// GET  /events
/// POST /admin/events
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events", get(events::list_events))
        .route("/admin/events", post(events::create_event))
}
