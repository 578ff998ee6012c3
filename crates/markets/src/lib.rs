//! HTTP clients for the Polymarket Gamma (market catalogue) and CLOB
//! (order book) APIs, plus the tolerant JSON helpers used to read them.

pub mod clob;
pub mod config;
pub mod error;
pub mod gamma;

pub use clob::ClobClient;
pub use config::MarketsConfig;
pub use error::MarketsError;
pub use gamma::GammaClient;
