//! Client for the Gamma market catalogue.
//!
//! Gamma payloads are loosely typed: the same concept shows up under
//! several key spellings, numbers arrive as strings, and lists are sometimes
//! JSON-encoded inside a string. The helpers below read markets as raw
//! [`serde_json::Value`]s and pick the first usable field.

use std::time::Duration;

use serde_json::Value;

use crate::error::MarketsError;

/// HTTP timeout for a single Gamma page request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Markets requested per Gamma page.
pub const PAGE_SIZE: usize = 100;

// ---------------------------------------------------------------------------
// GammaClient
// ---------------------------------------------------------------------------

/// HTTP client for the Gamma API.
pub struct GammaClient {
    client: reqwest::Client,
    base_url: String,
}

impl GammaClient {
    /// Create a client for a Gamma base URL, e.g. `https://gamma-api.polymarket.com`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self::with_client(client, base_url)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Fetch one page of active markets.
    ///
    /// Sends `GET /markets?limit=..&offset=..&active=true`.
    pub async fn get_markets(&self, limit: usize, offset: usize) -> Result<Vec<Value>, MarketsError> {
        let response = self
            .client
            .get(format!("{}/markets", self.base_url))
            .query(&[
                ("limit", limit.to_string()),
                ("offset", offset.to_string()),
                ("active", "true".to_string()),
            ])
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
        Ok(markets_from_body(body))
    }
}

// ---------------------------------------------------------------------------
// Payload helpers
// ---------------------------------------------------------------------------

/// Extract the market list from a Gamma response body.
///
/// Accepts a bare array or an object carrying `markets` or `data`.
pub fn markets_from_body(body: Value) -> Vec<Value> {
    match body {
        Value::Array(markets) => markets,
        Value::Object(mut map) => ["markets", "data"]
            .iter()
            .find_map(|key| match map.remove(*key) {
                Some(Value::Array(markets)) if !markets.is_empty() => Some(markets),
                _ => None,
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// Read a value as `f64`, accepting numbers and numeric strings.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Read a value as a non-empty identifier string.
fn as_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// The first key in `keys` whose value is "truthy" (not null, empty or zero).
fn first_present<'a>(market: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().filter_map(|k| market.get(*k)).find(|v| match v {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::Bool(b) => *b,
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    })
}

/// Trimmed market title from `question` or `title`, if non-empty.
pub fn market_title(market: &Value) -> Option<String> {
    first_present(market, &["question", "title"])
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

pub fn market_slug(market: &Value) -> Option<String> {
    market.get("slug").and_then(as_id)
}

/// Gamma market id from `id`, `marketId` or `market_id`.
pub fn market_id(market: &Value) -> Option<String> {
    first_present(market, &["id", "marketId", "market_id"]).and_then(as_id)
}

/// Ranking score: volume plus a tenth of liquidity. Missing fields count as 0.
pub fn market_score(market: &Value) -> f64 {
    let volume = first_present(market, &["volume", "volume24h", "volume_24hr"])
        .and_then(as_number)
        .unwrap_or(0.0);
    let liquidity = market.get("liquidity").and_then(as_number).unwrap_or(0.0);
    volume + 0.1 * liquidity
}

/// Trailing 24h volume in USD, if the market reports it.
pub fn volume_24h(market: &Value) -> Option<f64> {
    ["volume24hr", "volume24h", "volume_24hr"]
        .iter()
        .filter_map(|k| market.get(*k))
        .find_map(as_number)
        .filter(|v| v.is_finite() && *v >= 0.0)
}

/// Best-effort extraction of the YES outcome's CLOB token id.
///
/// Tries, in order: a `tokens`/`outcomes` entry labelled "yes", the first
/// entry of `clobTokenIds`/`clob_token_ids` (an array or a JSON-encoded
/// array string), then `yesTokenId`/`yes_token_id`.
pub fn extract_yes_token_id(market: &Value) -> Option<String> {
    if let Some(Value::Array(tokens)) = first_present(market, &["tokens", "outcomes"]) {
        for token in tokens {
            let label = ["outcome", "label", "name"]
                .iter()
                .find_map(|k| token.get(*k).and_then(Value::as_str).filter(|s| !s.is_empty()))
                .unwrap_or("");
            if label.trim().eq_ignore_ascii_case("yes") {
                let id = ["token_id", "tokenId", "tokenID", "id", "clobTokenId"]
                    .iter()
                    .find_map(|k| token.get(*k).and_then(as_id));
                if id.is_some() {
                    return id;
                }
            }
        }
    }

    if let Some(ids) = first_present(market, &["clobTokenIds", "clob_token_ids"]) {
        let first = match ids {
            Value::Array(ids) => ids.first().and_then(as_id),
            Value::String(encoded) => serde_json::from_str::<Vec<Value>>(encoded)
                .ok()
                .and_then(|ids| ids.first().and_then(as_id)),
            _ => None,
        };
        if first.is_some() {
            return first;
        }
    }

    first_present(market, &["yesTokenId", "yes_token_id"]).and_then(as_id)
}
