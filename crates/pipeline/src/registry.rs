use std::sync::Arc;

use edge_core::error::CoreError;
use edge_core::jobs::{JobDefinition, JobRegistry};
use edge_db::DbPool;
use edge_markets::{ClobClient, GammaClient, MarketsConfig};

use crate::{DiscoverMarkets, ForecastMachine, SnapshotPm, UpdatePrices};

pub const DISCOVER_MARKETS: &str = "discover_markets";
pub const SNAPSHOT_PM: &str = "snapshot_pm";
pub const FORECAST_MACHINE: &str = "forecast_machine";
pub const UPDATE_PRICES: &str = "update_prices";

/// Every job name the pipeline registers.
pub const JOB_NAMES: [&str; 4] = [DISCOVER_MARKETS, SNAPSHOT_PM, FORECAST_MACHINE, UPDATE_PRICES];

/// Build the registry of pipeline jobs.
pub fn build_registry(
    pool: DbPool,
    gamma: Arc<GammaClient>,
    clob: Arc<ClobClient>,
    config: Arc<MarketsConfig>,
) -> Result<JobRegistry, CoreError> {
    Ok(JobRegistry::builder()
        .register(JobDefinition::new(
            DISCOVER_MARKETS,
            DiscoverMarkets::new(pool.clone(), gamma, config),
        ))?
        .register(JobDefinition::new(
            SNAPSHOT_PM,
            SnapshotPm::new(pool.clone(), Arc::clone(&clob)),
        ))?
        .register(JobDefinition::new(
            FORECAST_MACHINE,
            ForecastMachine::new(pool.clone()),
        ))?
        .register(JobDefinition::new(UPDATE_PRICES, UpdatePrices::new(pool, clob)))?
        .build())
}
