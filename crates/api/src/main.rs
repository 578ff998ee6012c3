use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use edge_core::admin_token::AdminSecret;
use edge_core::jobs::{AdminGateway, JobEventSink, JobExecutionTracker};
use edge_markets::{ClobClient, GammaClient, MarketsConfig};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use edge_api::config::ServerConfig;
use edge_api::router::build_app_router;
use edge_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "edge_api=debug,edge_core=debug,edge_pipeline=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    let markets_config = Arc::new(MarketsConfig::from_env());
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let pool = edge_db::create_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    edge_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    edge_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Event bus ---
    let event_bus = Arc::new(edge_events::EventBus::default());
    let logger_cancel = CancellationToken::new();
    let logger_handle = tokio::spawn(edge_events::EventLogger::run(
        event_bus.subscribe(),
        logger_cancel.clone(),
    ));
    tracing::info!("Event bus and job event logger started");

    // --- Jobs ---
    let registry = edge_pipeline::build_registry(
        pool.clone(),
        Arc::new(GammaClient::new(markets_config.gamma_base.clone())),
        Arc::new(ClobClient::new(markets_config.clob_base.clone())),
        Arc::clone(&markets_config),
    )
    .expect("Failed to build job registry");
    tracing::info!(jobs = ?registry.names().collect::<Vec<_>>(), "Job registry built");

    let secret = AdminSecret::new(&config.admin_token).expect("Invalid admin token configuration");
    let tracker = Arc::new(JobExecutionTracker::with_history_limit(
        config.job_history_limit,
    ));
    let sink: Arc<dyn JobEventSink> = event_bus.clone();
    let gateway = Arc::new(AdminGateway::new(
        secret,
        Arc::new(registry),
        Arc::clone(&tracker),
        sink,
    ));

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        gateway,
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    let active = tracker.active_count().await;
    if active > 0 {
        tracing::warn!(active, "Shutting down with job executions still in flight");
    }

    logger_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), logger_handle).await;
    tracing::info!("Job event logger stopped");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
