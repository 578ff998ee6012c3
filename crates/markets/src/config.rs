/// Default keyword list for market discovery.
pub const DEFAULT_DISCOVER_KEYWORDS: &str = "bitcoin,btc,ethereum,eth,sol,solana,crypto,memecoin,\
doge,ai,trump,election,fed,inflation,rate";

/// Market data configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct MarketsConfig {
    /// Gamma API base URL without a trailing slash.
    pub gamma_base: String,
    /// CLOB API base URL without a trailing slash.
    pub clob_base: String,
    /// Maximum number of markets kept per discovery run.
    pub discover_limit: usize,
    /// Number of Gamma pages scanned per discovery run.
    pub discover_pages: usize,
    /// Lower-cased title keywords; a market must match at least one.
    pub discover_keywords: Vec<String>,
}

impl MarketsConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                             |
    /// |------------------------|-------------------------------------|
    /// | `PM_GAMMA_BASE`        | `https://gamma-api.polymarket.com`  |
    /// | `PM_CLOB_BASE`         | `https://clob.polymarket.com`       |
    /// | `PM_DISCOVER_LIMIT`    | `50`                                |
    /// | `PM_DISCOVER_PAGES`    | `5`                                 |
    /// | `PM_DISCOVER_KEYWORDS` | crypto, macro and politics keywords |
    pub fn from_env() -> Self {
        let gamma_base = std::env::var("PM_GAMMA_BASE")
            .unwrap_or_else(|_| "https://gamma-api.polymarket.com".into());

        let clob_base =
            std::env::var("PM_CLOB_BASE").unwrap_or_else(|_| "https://clob.polymarket.com".into());

        let discover_limit: usize = std::env::var("PM_DISCOVER_LIMIT")
            .unwrap_or_else(|_| "50".into())
            .parse()
            .expect("PM_DISCOVER_LIMIT must be a valid usize");

        let discover_pages: usize = std::env::var("PM_DISCOVER_PAGES")
            .unwrap_or_else(|_| "5".into())
            .parse()
            .expect("PM_DISCOVER_PAGES must be a valid usize");

        let keywords = std::env::var("PM_DISCOVER_KEYWORDS")
            .unwrap_or_else(|_| DEFAULT_DISCOVER_KEYWORDS.into());

        Self {
            gamma_base: trim_base(&gamma_base),
            clob_base: trim_base(&clob_base),
            discover_limit,
            discover_pages,
            discover_keywords: parse_keywords(&keywords),
        }
    }
}

/// Split a comma-separated keyword list, trimming and lower-casing entries.
pub fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

fn trim_base(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}
