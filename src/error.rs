use reqwest::StatusCode;
use thiserror::Error;

/// All errors surfaced by the price aggregation core.
#[derive(Debug, Error)]
pub enum PriceError {
    #[error("market data request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("market data api error {status}: {body}")]
    Api { status: StatusCode, body: String },

    #[error("market data validation failed: {0}")]
    Validation(String),

    #[error("ticker pagination exceeded {max_pages} pages for {coin_id}")]
    PaginationExceeded { coin_id: String, max_pages: u32 },

    #[error("storage operation failed: {0}")]
    Storage(#[from] sea_orm::DbErr),

    #[error("snapshot encoding failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid time range: from {from} must be earlier than to {to}")]
    InvalidRange { from: i64, to: i64 },
}
