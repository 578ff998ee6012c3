//! Handlers for the `/events` resource.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use edge_core::error::CoreError;
use edge_db::models::event::CreateEvent;
use edge_db::repositories::EventRepo;
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::admin::AdminToken;
use crate::state::AppState;

/// Default and maximum page sizes for the event list.
pub const DEFAULT_EVENT_LIMIT: i64 = 50;
pub const MAX_EVENT_LIMIT: i64 = 500;

#[derive(Debug, Deserialize)]
pub struct EventListQuery {
    pub limit: Option<i64>,
}

/// GET /v1/events?limit=N
///
/// Public list of tracked events, newest first. `limit` is clamped to
/// `1..=500`.
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventListQuery>,
) -> AppResult<impl IntoResponse> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_EVENT_LIMIT)
        .clamp(1, MAX_EVENT_LIMIT);
    let events = EventRepo::list(&state.pool, limit).await?;
    Ok(Json(events))
}

/// POST /v1/admin/events
///
/// Create an event by hand from a title. Returns 201 with the new event.
pub async fn create_event(
    _admin: AdminToken,
    State(state): State<AppState>,
    Json(input): Json<CreateEvent>,
) -> AppResult<impl IntoResponse> {
    let title = input.title.trim();
    if title.is_empty() {
        return Err(CoreError::Validation("Event title must not be empty".into()).into());
    }

    let event = EventRepo::create(&state.pool, title).await?;
    tracing::info!(event_id = %event.id, "Event created");

    Ok((StatusCode::CREATED, Json(event)))
}
