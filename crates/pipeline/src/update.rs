//! `update_prices`: snapshot then forecast in one run.

use std::sync::Arc;

use async_trait::async_trait;
use edge_core::jobs::{Job, JobOutput};
use edge_db::DbPool;
use edge_markets::ClobClient;
use serde_json::json;

use crate::forecast::forecast_all;
use crate::snapshot::snapshot_prices;

pub struct UpdatePrices {
    pool: DbPool,
    clob: Arc<ClobClient>,
}

impl UpdatePrices {
    pub fn new(pool: DbPool, clob: Arc<ClobClient>) -> Self {
        Self { pool, clob }
    }
}

#[async_trait]
impl Job for UpdatePrices {
    async fn run(&self) -> anyhow::Result<JobOutput> {
        let snapshot_updated = snapshot_prices(&self.pool, &self.clob).await?;
        let forecast_updated = forecast_all(&self.pool).await?;
        Ok(json!({
            "snapshot_updated": snapshot_updated,
            "forecast_updated": forecast_updated,
        }))
    }
}
