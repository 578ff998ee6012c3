#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use edge_api::config::ServerConfig;
use edge_api::router::build_app_router;
use edge_api::state::AppState;
use edge_core::admin_token::AdminSecret;
use edge_core::jobs::{AdminGateway, JobDefinition, JobExecutionTracker, JobOutput, JobRegistry};
use edge_events::EventBus;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::ServiceExt;

pub const ADMIN_TOKEN: &str = "test-admin-token";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        database_url: "sqlite::memory:".to_string(),
        admin_token: ADMIN_TOKEN.to_string(),
        job_history_limit: 20,
    }
}

/// Registry of fake jobs used by the HTTP tests.
///
/// - `cleanup` sleeps 100 ms then succeeds.
/// - `boom` fails immediately with "disk full".
/// - `quick` succeeds immediately.
pub fn test_registry() -> JobRegistry {
    JobRegistry::builder()
        .register(JobDefinition::from_fn("cleanup", || async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok::<_, anyhow::Error>(json!({"cleaned": 3}))
        }))
        .unwrap()
        .register(JobDefinition::from_fn("boom", || async {
            Err::<JobOutput, _>(anyhow::anyhow!("disk full"))
        }))
        .unwrap()
        .register(JobDefinition::from_fn("quick", || async {
            Ok::<_, anyhow::Error>(json!({}))
        }))
        .unwrap()
        .build()
}

pub struct TestApp {
    pub router: Router,
    pub tracker: Arc<JobExecutionTracker>,
}

/// Build the full application router (same middleware stack as `main.rs`)
/// around the given pool and the fake job registry.
pub fn build_test_app(pool: SqlitePool) -> TestApp {
    let config = test_config();
    let tracker = Arc::new(JobExecutionTracker::with_history_limit(config.job_history_limit));
    let gateway = AdminGateway::new(
        AdminSecret::new(ADMIN_TOKEN).unwrap(),
        Arc::new(test_registry()),
        Arc::clone(&tracker),
        Arc::new(EventBus::default()),
    );

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        gateway: Arc::new(gateway),
    };

    TestApp {
        router: build_app_router(state, &config),
        tracker,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("x-admin-token", token);
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn admin_get(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(ADMIN_TOKEN), None).await
}

pub async fn admin_post(app: &Router, uri: &str, body: Option<Value>) -> Response<Body> {
    send(app, Method::POST, uri, Some(ADMIN_TOKEN), body).await
}

/// Read a response body as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Poll the status endpoint until the job reaches a terminal status.
pub async fn wait_for_terminal(app: &Router, job_name: &str) -> Value {
    for _ in 0..200 {
        let response = admin_get(app, &format!("/v1/admin/jobs/status?job_name={job_name}")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        if json["status"] == "succeeded" || json["status"] == "failed" {
            return json;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {job_name} did not finish in time");
}
