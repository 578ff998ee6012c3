//! `snapshot_pm`: record the current market price of every tokenized event.

use std::sync::Arc;

use async_trait::async_trait;
use edge_core::forecast::clamp01;
use edge_core::jobs::{Job, JobOutput};
use edge_db::repositories::EventRepo;
use edge_db::DbPool;
use edge_markets::ClobClient;
use serde_json::json;

pub struct SnapshotPm {
    pool: DbPool,
    clob: Arc<ClobClient>,
}

impl SnapshotPm {
    pub fn new(pool: DbPool, clob: Arc<ClobClient>) -> Self {
        Self { pool, clob }
    }
}

#[async_trait]
impl Job for SnapshotPm {
    async fn run(&self) -> anyhow::Result<JobOutput> {
        let updated = snapshot_prices(&self.pool, &self.clob).await?;
        Ok(json!({ "updated": updated }))
    }
}

/// Fetch and store the clamped midpoint for each event with a YES token.
///
/// Events whose price is unavailable are skipped. Returns the number of
/// events updated.
pub async fn snapshot_prices(pool: &DbPool, clob: &ClobClient) -> anyhow::Result<u64> {
    let events = EventRepo::list_tokenized(pool).await?;
    let mut updated = 0u64;

    for event in &events {
        let Some(price) = clob.midpoint(&event.yes_token_id).await else {
            continue;
        };
        if EventRepo::set_pm_price(pool, &event.id, clamp01(price)).await? {
            updated += 1;
        }
    }

    tracing::info!(tokenized = events.len(), updated, "Market price snapshot finished");
    Ok(updated)
}
