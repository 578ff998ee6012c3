//! Client for the CLOB order book price endpoints.

use std::time::Duration;

use serde_json::Value;

use crate::error::MarketsError;
use crate::gamma::as_number;

/// HTTP timeout for a single price request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(8);

/// Attempts per endpoint before moving on.
const ATTEMPTS_PER_ENDPOINT: u32 = 3;

/// Backoff unit; attempt `n` (1-based) waits `n` units after failing.
const DEFAULT_RETRY_BASE: Duration = Duration::from_millis(250);

/// Price endpoints, tried in order.
const ENDPOINTS: [&str; 2] = ["midpoint", "price"];

/// HTTP client for the CLOB API.
pub struct ClobClient {
    client: reqwest::Client,
    base_url: String,
    retry_base: Duration,
}

impl ClobClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self::with_client(client, base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry_base: DEFAULT_RETRY_BASE,
        }
    }

    /// Override the retry backoff unit.
    pub fn with_retry_base(mut self, retry_base: Duration) -> Self {
        self.retry_base = retry_base;
        self
    }

    /// Current midpoint price of a token, or `None` when unavailable.
    ///
    /// Tries `/midpoint` then `/price`, each up to three times with linear
    /// backoff. A successful response without a price field ends the search.
    /// Failures are logged and never surfaced.
    pub async fn midpoint(&self, token_id: &str) -> Option<f64> {
        for endpoint in ENDPOINTS {
            for attempt in 1..=ATTEMPTS_PER_ENDPOINT {
                match self.fetch(endpoint, token_id).await {
                    Ok(price) => return price,
                    Err(e) => {
                        tracing::debug!(
                            endpoint,
                            token_id,
                            attempt,
                            error = %e,
                            "CLOB price request failed"
                        );
                        tokio::time::sleep(self.retry_base * attempt).await;
                    }
                }
            }
        }

        tracing::warn!(token_id, "No CLOB price available after all attempts");
        None
    }

    async fn fetch(&self, endpoint: &str, token_id: &str) -> Result<Option<f64>, MarketsError> {
        let response = self
            .client
            .get(format!("{}/{endpoint}", self.base_url))
            .query(&[("token_id", token_id)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(MarketsError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response.json().await?;
        read_price(&body)
    }
}

/// Read a price from a CLOB response body.
///
/// Looks for `midpoint`, `mid` or `price` at the top level, then under
/// `data`. Returns `Ok(None)` when no price field is present and an error
/// when one is present but not numeric.
pub fn read_price(body: &Value) -> Result<Option<f64>, MarketsError> {
    let field = price_field(body).or_else(|| body.get("data").and_then(price_field));
    match field {
        None => Ok(None),
        Some(value) => as_number(value)
            .filter(|p| p.is_finite())
            .map(Some)
            .ok_or_else(|| MarketsError::InvalidPrice(value.to_string())),
    }
}

fn price_field(body: &Value) -> Option<&Value> {
    ["midpoint", "mid", "price"]
        .iter()
        .filter_map(|k| body.get(*k))
        .find(|v| !v.is_null())
}
