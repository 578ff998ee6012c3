//! Event entity model and DTOs.

use edge_core::types::Timestamp;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub created_at: Timestamp,
    pub slug: Option<String>,
    pub gamma_market_id: Option<String>,
    pub yes_token_id: Option<String>,
    pub volume_24h: Option<f64>,
    pub latest_pm_p: Option<f64>,
    pub latest_machine_p: Option<f64>,
}

/// DTO for creating an event by hand.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEvent {
    pub title: String,
}

/// A market found during discovery, ready to be upserted.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveredMarket {
    pub title: String,
    pub slug: Option<String>,
    pub gamma_market_id: Option<String>,
    pub yes_token_id: String,
    pub volume_24h: Option<f64>,
}

/// Projection of an event that can be priced on the order book.
#[derive(Debug, Clone, FromRow)]
pub struct TokenizedEvent {
    pub id: String,
    pub yes_token_id: String,
}

/// Projection of an event that has a market price.
#[derive(Debug, Clone, FromRow)]
pub struct PricedEvent {
    pub id: String,
    pub latest_pm_p: f64,
    pub volume_24h: Option<f64>,
}

/// Whether an upsert created a new row or refreshed an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertResult {
    Inserted,
    Updated,
}
