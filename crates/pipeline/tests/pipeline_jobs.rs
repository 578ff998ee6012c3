use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::Query;
use axum::routing::get;
use axum::{Json, Router};
use edge_core::jobs::Job;
use edge_db::repositories::EventRepo;
use edge_markets::{ClobClient, GammaClient, MarketsConfig};
use edge_pipeline::{build_registry, DiscoverMarkets, ForecastMachine, SnapshotPm, UpdatePrices, JOB_NAMES};
use serde_json::{json, Value};
use sqlx::SqlitePool;

// ---------------------------------------------------------------------------
// Stub market APIs
// ---------------------------------------------------------------------------

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

async fn gamma_markets(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    if params.get("offset").map(String::as_str) != Some("0") {
        return Json(json!([]));
    }
    Json(json!({
        "markets": [
            {"question": "Will BTC reach 150k?", "slug": "btc-150k", "id": 1,
             "volume": "900000", "volume24hr": 900000, "clobTokenIds": "[\"tok-btc\", \"tok-btc-no\"]"},
            {"question": "Will the Fed cut rates?", "slug": "fed-cut", "id": 2,
             "volume": 400, "tokens": [{"outcome": "Yes", "token_id": "tok-fed"}]},
            {"question": "Best picture winner", "slug": "oscars", "id": 3,
             "volume": 1e9, "clobTokenIds": ["tok-oscars"]},
        ]
    }))
}

async fn clob_midpoint(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    match params.get("token_id").map(String::as_str) {
        Some("tok-btc") => Json(json!({"mid": "0.64"})),
        Some("tok-fed") => Json(json!({"midpoint": 1.7})),
        _ => Json(json!({})),
    }
}

struct Stubs {
    gamma: Arc<GammaClient>,
    clob: Arc<ClobClient>,
    config: Arc<MarketsConfig>,
}

async fn stubs() -> Stubs {
    let gamma_url = serve(Router::new().route("/markets", get(gamma_markets))).await;
    let clob_url = serve(Router::new().route("/midpoint", get(clob_midpoint))).await;

    Stubs {
        gamma: Arc::new(GammaClient::new(gamma_url.clone())),
        clob: Arc::new(ClobClient::new(clob_url.clone()).with_retry_base(Duration::from_millis(1))),
        config: Arc::new(MarketsConfig {
            gamma_base: gamma_url,
            clob_base: clob_url,
            discover_limit: 10,
            discover_pages: 3,
            discover_keywords: vec!["btc".to_string(), "fed".to_string()],
        }),
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn registry_contains_every_pipeline_job(pool: SqlitePool) {
    let stubs = stubs().await;
    let registry = build_registry(pool, stubs.gamma, stubs.clob, stubs.config).unwrap();

    assert_eq!(registry.len(), JOB_NAMES.len());
    for name in JOB_NAMES {
        assert!(registry.contains(name), "missing {name}");
    }
}

// ---------------------------------------------------------------------------
// Jobs
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn discover_upserts_matching_markets(pool: SqlitePool) {
    let stubs = stubs().await;
    let job = DiscoverMarkets::new(pool.clone(), stubs.gamma, stubs.config);

    let output = job.run().await.unwrap();
    assert_eq!(output, json!({"discovered": 2}));

    // Re-running refreshes rows instead of duplicating them.
    job.run().await.unwrap();
    let events = EventRepo::list(&pool, 50).await.unwrap();
    assert_eq!(events.len(), 2);

    let btc = events.iter().find(|e| e.slug.as_deref() == Some("btc-150k")).unwrap();
    assert_eq!(btc.yes_token_id.as_deref(), Some("tok-btc"));
    assert_eq!(btc.gamma_market_id.as_deref(), Some("1"));
    assert_eq!(btc.volume_24h, Some(900_000.0));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn snapshot_stores_clamped_prices_and_skips_unpriced(pool: SqlitePool) {
    let stubs = stubs().await;
    DiscoverMarkets::new(pool.clone(), Arc::clone(&stubs.gamma), Arc::clone(&stubs.config))
        .run()
        .await
        .unwrap();
    EventRepo::upsert_discovered(
        &pool,
        &edge_db::models::event::DiscoveredMarket {
            title: "Unpriced".to_string(),
            slug: None,
            gamma_market_id: None,
            yes_token_id: "tok-unknown".to_string(),
            volume_24h: None,
        },
    )
    .await
    .unwrap();

    let output = SnapshotPm::new(pool.clone(), stubs.clob).run().await.unwrap();
    assert_eq!(output, json!({"updated": 2}));

    let priced = EventRepo::list_priced(&pool).await.unwrap();
    let mut prices: Vec<f64> = priced.iter().map(|e| e.latest_pm_p).collect();
    prices.sort_by(f64::total_cmp);
    assert_eq!(prices, vec![0.64, 1.0]);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn forecast_writes_machine_prices(pool: SqlitePool) {
    let manual = EventRepo::create(&pool, "manual").await.unwrap();
    EventRepo::set_pm_price(&pool, &manual.id, 0.8).await.unwrap();
    let unpriced = EventRepo::create(&pool, "unpriced").await.unwrap();

    let output = ForecastMachine::new(pool.clone()).run().await.unwrap();
    assert_eq!(output, json!({"updated": 1}));

    let manual = EventRepo::find_by_id(&pool, &manual.id).await.unwrap().unwrap();
    let machine = manual.latest_machine_p.unwrap();
    assert!((machine - 0.77).abs() < 1e-9);

    let unpriced = EventRepo::find_by_id(&pool, &unpriced.id).await.unwrap().unwrap();
    assert_eq!(unpriced.latest_machine_p, None);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn update_prices_snapshots_then_forecasts(pool: SqlitePool) {
    let stubs = stubs().await;
    DiscoverMarkets::new(pool.clone(), Arc::clone(&stubs.gamma), Arc::clone(&stubs.config))
        .run()
        .await
        .unwrap();

    let output = UpdatePrices::new(pool.clone(), stubs.clob).run().await.unwrap();
    assert_eq!(output, json!({"snapshot_updated": 2, "forecast_updated": 2}));

    let events = EventRepo::list(&pool, 50).await.unwrap();
    let btc = events.iter().find(|e| e.slug.as_deref() == Some("btc-150k")).unwrap();
    // Volume above the anchor: the machine follows the crowd.
    assert!((btc.latest_machine_p.unwrap() - 0.64).abs() < 1e-9);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn discover_fails_when_gamma_is_unreachable(pool: SqlitePool) {
    let config = Arc::new(MarketsConfig {
        gamma_base: "http://127.0.0.1:9".to_string(),
        clob_base: "http://127.0.0.1:9".to_string(),
        discover_limit: 5,
        discover_pages: 1,
        discover_keywords: vec!["btc".to_string()],
    });
    let gamma = Arc::new(GammaClient::new(config.gamma_base.clone()));

    let err = DiscoverMarkets::new(pool, gamma, config).run().await.unwrap_err();
    assert!(err.to_string().contains("Gamma"), "unexpected error: {err}");
}
