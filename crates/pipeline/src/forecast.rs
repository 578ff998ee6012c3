//! `forecast_machine`: derive the machine estimate from stored market prices.

use async_trait::async_trait;
use edge_core::forecast::{compute_machine_p, machine_from_pm};
use edge_core::jobs::{Job, JobOutput};
use edge_db::repositories::EventRepo;
use edge_db::DbPool;
use serde_json::json;

pub struct ForecastMachine {
    pool: DbPool,
}

impl ForecastMachine {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Job for ForecastMachine {
    async fn run(&self) -> anyhow::Result<JobOutput> {
        let updated = forecast_all(&self.pool).await?;
        Ok(json!({ "updated": updated }))
    }
}

/// Machine probability for a market price.
///
/// Uses the volume-anchored model when the 24h volume is known and the plain
/// shrink-to-even model otherwise.
pub fn machine_estimate(pm_p: f64, volume_24h: Option<f64>) -> f64 {
    match volume_24h {
        Some(volume) => compute_machine_p(pm_p, volume),
        None => machine_from_pm(pm_p),
    }
}

/// Recompute `latest_machine_p` for every priced event.
pub async fn forecast_all(pool: &DbPool) -> anyhow::Result<u64> {
    let events = EventRepo::list_priced(pool).await?;
    let mut updated = 0u64;

    for event in &events {
        let estimate = machine_estimate(event.latest_pm_p, event.volume_24h);
        if EventRepo::set_machine_price(pool, &event.id, estimate).await? {
            updated += 1;
        }
    }

    tracing::info!(updated, "Machine forecast finished");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_volume_uses_shrink_model() {
        assert!((machine_estimate(0.5, None) - 0.5).abs() < 1e-12);
        assert!((machine_estimate(0.8, None) - 0.77).abs() < 1e-12);
    }

    #[test]
    fn deep_volume_trusts_the_crowd() {
        assert!((machine_estimate(0.7, Some(1_000_000.0)) - 0.7).abs() < 1e-12);
    }

    #[test]
    fn thin_volume_pulls_to_even() {
        assert!((machine_estimate(0.7, Some(0.0)) - 0.5).abs() < 1e-12);
    }
}
