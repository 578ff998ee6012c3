//! SQLite persistence for the Edge Machine.
//!
//! Exposes the connection pool helpers, embedded migrations, the `events`
//! model and its repository.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

pub mod models;
pub mod repositories;

pub type DbPool = sqlx::SqlitePool;

/// Convert a `sqlite:///<path>` URL into the form sqlx expects.
///
/// Everything after `sqlite:///` is treated as a filesystem path, so
/// `sqlite:///./pm.db` means `./pm.db` and `sqlite:////var/pm.db` means
/// `/var/pm.db`. Other URLs are returned unchanged.
pub fn normalize_database_url(url: &str) -> String {
    match url.strip_prefix("sqlite:///") {
        Some(path) => format!("sqlite://{path}"),
        None => url.to_string(),
    }
}

/// Create a connection pool from a database URL, creating the file if needed.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    let options =
        SqliteConnectOptions::from_str(&normalize_database_url(database_url))?.create_if_missing(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
}

/// Verify the database answers a trivial query.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Columns added to `events` after its first release, with their SQL types.
const EVENTS_LATER_COLUMNS: &[(&str, &str)] = &[
    ("slug", "TEXT"),
    ("gamma_market_id", "TEXT"),
    ("yes_token_id", "TEXT"),
    ("volume_24h", "REAL"),
    ("latest_pm_p", "REAL"),
    ("latest_machine_p", "REAL"),
];

/// Apply all pending migrations from `crates/db/migrations`.
///
/// An `events` table created before migrations were tracked is first
/// brought up to the current column set, so the initial migration (a no-op
/// on an existing table) can index it.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    upgrade_events_table(pool).await?;
    sqlx::migrate!("./migrations").run(pool).await
}

/// Add any columns added since the first release to an existing `events` table.
///
/// Returns the columns that were added. Does nothing if the table does not
/// exist yet.
pub async fn upgrade_events_table(pool: &DbPool) -> Result<Vec<&'static str>, sqlx::Error> {
    let existing: Vec<String> =
        sqlx::query_scalar("SELECT name FROM pragma_table_info('events')")
            .fetch_all(pool)
            .await?;
    if existing.is_empty() {
        return Ok(Vec::new());
    }

    let mut added = Vec::new();
    for &(column, sql_type) in EVENTS_LATER_COLUMNS {
        if existing.iter().any(|name| name == column) {
            continue;
        }
        let ddl = format!("ALTER TABLE events ADD COLUMN {column} {sql_type}");
        sqlx::query(&ddl).execute(pool).await?;
        tracing::info!(column, "Added missing column to existing events table");
        added.push(column);
    }
    Ok(added)
}
