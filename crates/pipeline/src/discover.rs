//! `discover_markets`: pull active markets from Gamma and upsert the most
//! relevant ones into the events table.

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use edge_core::jobs::{Job, JobOutput};
use edge_db::models::event::{DiscoveredMarket, UpsertResult};
use edge_db::repositories::EventRepo;
use edge_db::DbPool;
use edge_markets::gamma::{self, PAGE_SIZE};
use edge_markets::{GammaClient, MarketsConfig};
use serde_json::{json, Value};

pub struct DiscoverMarkets {
    pool: DbPool,
    gamma: Arc<GammaClient>,
    config: Arc<MarketsConfig>,
}

impl DiscoverMarkets {
    pub fn new(pool: DbPool, gamma: Arc<GammaClient>, config: Arc<MarketsConfig>) -> Self {
        Self {
            pool,
            gamma,
            config,
        }
    }
}

#[async_trait]
impl Job for DiscoverMarkets {
    async fn run(&self) -> anyhow::Result<JobOutput> {
        let mut markets = Vec::new();
        for page in 0..self.config.discover_pages {
            let offset = page * PAGE_SIZE;
            let batch = self
                .gamma
                .get_markets(PAGE_SIZE, offset)
                .await
                .with_context(|| format!("Failed to fetch Gamma markets at offset {offset}"))?;
            if batch.is_empty() {
                break;
            }
            markets.extend(batch);
        }

        let scanned = markets.len();
        let selected = select_markets(
            markets,
            &self.config.discover_keywords,
            self.config.discover_limit,
        );

        let mut inserted = 0u64;
        for market in &selected {
            if EventRepo::upsert_discovered(&self.pool, market).await? == UpsertResult::Inserted {
                inserted += 1;
            }
        }

        tracing::info!(
            scanned,
            discovered = selected.len(),
            inserted,
            "Market discovery finished"
        );
        Ok(json!({ "discovered": selected.len() }))
    }
}

/// Pick the markets worth tracking.
///
/// Keeps markets whose title contains any keyword, ranks them by
/// [`gamma::market_score`] (highest first), takes the top `limit`, and drops
/// those without a YES token. Fewer than `limit` markets may be returned.
pub fn select_markets(markets: Vec<Value>, keywords: &[String], limit: usize) -> Vec<DiscoveredMarket> {
    let mut candidates: Vec<(f64, String, Value)> = markets
        .into_iter()
        .filter_map(|market| {
            let title = gamma::market_title(&market)?;
            let lowered = title.to_lowercase();
            keywords
                .iter()
                .any(|k| lowered.contains(k.as_str()))
                .then(|| (gamma::market_score(&market), title, market))
        })
        .collect();

    // Stable sort keeps Gamma's order among equal scores.
    candidates.sort_by(|a, b| b.0.total_cmp(&a.0));

    candidates
        .into_iter()
        .take(limit)
        .filter_map(|(_, title, market)| {
            let yes_token_id = gamma::extract_yes_token_id(&market)?;
            Some(DiscoveredMarket {
                title,
                slug: gamma::market_slug(&market),
                gamma_market_id: gamma::market_id(&market),
                yes_token_id,
                volume_24h: gamma::volume_24h(&market),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keywords() -> Vec<String> {
        vec!["btc".to_string(), "fed".to_string()]
    }

    #[test]
    fn filters_by_keyword_case_insensitively() {
        let markets = vec![
            json!({"question": "Will BTC hit 200k?", "clobTokenIds": ["1", "2"]}),
            json!({"question": "Who wins the cup?", "clobTokenIds": ["3", "4"]}),
        ];

        let selected = select_markets(markets, &keywords(), 10);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].yes_token_id, "1");
    }

    #[test]
    fn ranks_by_score_and_applies_limit_before_token_filter() {
        let markets = vec![
            json!({"question": "btc low", "volume": 10, "clobTokenIds": ["low"]}),
            json!({"question": "btc no token", "volume": 1000}),
            json!({"question": "fed high", "volume": 500, "liquidity": 100, "clobTokenIds": ["high"]}),
        ];

        let selected = select_markets(markets, &keywords(), 2);
        let tokens: Vec<_> = selected.iter().map(|m| m.yes_token_id.as_str()).collect();
        assert_eq!(tokens, vec!["high"]);
    }

    #[test]
    fn carries_metadata() {
        let markets = vec![json!({
            "question": " Fed cuts in March? ",
            "slug": "fed-march",
            "id": "77",
            "volume24hr": "2500",
            "yesTokenId": "yes-77",
        })];

        let selected = select_markets(markets, &keywords(), 5);
        assert_eq!(
            selected,
            vec![DiscoveredMarket {
                title: "Fed cuts in March?".to_string(),
                slug: Some("fed-march".to_string()),
                gamma_market_id: Some("77".to_string()),
                yes_token_id: "yes-77".to_string(),
                volume_24h: Some(2500.0),
            }]
        );
    }

    #[test]
    fn untitled_markets_are_skipped() {
        let markets = vec![json!({"clobTokenIds": ["1"], "volume": 9e9})];
        assert!(select_markets(markets, &keywords(), 5).is_empty());
    }
}
