/// Errors from the market data clients.
#[derive(Debug, thiserror::Error)]
pub enum MarketsError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The upstream API returned a non-2xx status code.
    #[error("Market API error ({status}): {body}")]
    ApiError { status: u16, body: String },

    /// A price field was present but not a number.
    #[error("Invalid price value: {0}")]
    InvalidPrice(String),
}
