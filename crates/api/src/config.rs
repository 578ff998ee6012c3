use std::fmt;

use edge_core::jobs::DEFAULT_HISTORY_LIMIT;

/// Server configuration loaded from environment variables.
///
/// Everything except the admin token has a default suitable for local
/// development.
#[derive(Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    /// A single `*` allows any origin.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// SQLite database URL (default: `sqlite://pm.db`).
    pub database_url: String,
    /// Shared secret expected in the `x-admin-token` header.
    pub admin_token: String,
    /// Finished executions kept per job (default: `20`).
    pub job_history_limit: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default          |
    /// |------------------------|------------------|
    /// | `HOST`                 | `0.0.0.0`        |
    /// | `PORT`                 | `8000`           |
    /// | `CORS_ORIGINS`         | `*`              |
    /// | `REQUEST_TIMEOUT_SECS` | `30`             |
    /// | `PM_DATABASE_URL`      | `sqlite://pm.db` |
    /// | `ADMIN_TOKEN`          | required         |
    /// | `PM_ADMIN_TOKEN`       | fallback name    |
    /// | `JOB_HISTORY_LIMIT`    | `20`             |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins =
            parse_origins(&std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".into()));

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let database_url =
            std::env::var("PM_DATABASE_URL").unwrap_or_else(|_| "sqlite://pm.db".into());

        let admin_token = resolve_admin_token(
            std::env::var("ADMIN_TOKEN").ok(),
            std::env::var("PM_ADMIN_TOKEN").ok(),
        )
        .expect("ADMIN_TOKEN or PM_ADMIN_TOKEN must be set");

        let job_history_limit: usize = std::env::var("JOB_HISTORY_LIMIT")
            .unwrap_or_else(|_| DEFAULT_HISTORY_LIMIT.to_string())
            .parse()
            .expect("JOB_HISTORY_LIMIT must be a valid usize");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            database_url,
            admin_token,
            job_history_limit,
        }
    }

    /// Whether CORS should accept any origin.
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("cors_origins", &self.cors_origins)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("database_url", &self.database_url)
            .field("admin_token", &"<redacted>")
            .field("job_history_limit", &self.job_history_limit)
            .finish()
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// `ADMIN_TOKEN` wins over `PM_ADMIN_TOKEN`; blank values count as unset.
fn resolve_admin_token(primary: Option<String>, fallback: Option<String>) -> Option<String> {
    [primary, fallback]
        .into_iter()
        .flatten()
        .find(|t| !t.trim().is_empty())
}
