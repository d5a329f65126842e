use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Normalized ticker: one observed trade quote that survived filtering.
/// Exists only for the duration of one aggregation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    pub base: String,
    pub target: String,
    pub last: f64,
    pub coin_id: String,
    pub exchange_id: String,
}

/// Per-exchange contribution to an aggregated coin price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeQuote {
    pub exchange: String,
    pub price: f64,
}

/// Aggregated price for one coin: the mean of all contributing exchange
/// quotes, formatted to exactly two decimals, plus the per-exchange
/// breakdown in observation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinPrice {
    pub timestamp: i64,
    pub price: String,
    pub exchanges: Vec<ExchangeQuote>,
}

/// The unit of persistence: coin id -> aggregated price.
pub type PriceSnapshot = BTreeMap<String, CoinPrice>;

/// Value stored under the well-known `latest` key, referencing the most
/// recently written snapshot record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestPointer {
    pub key: String,
}

/// One decoded record of a historical range query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalEntry {
    pub timestamp: i64,
    pub data: PriceSnapshot,
}

/// Request body of the `getHistoricalPrices` RPC method. Both bounds are
/// millisecond timestamps; absence is reported as an invalid range.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoricalQuery {
    pub from: Option<i64>,
    pub to: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
