use serde::Deserialize;

/// One row of the `/coins/markets` ranking. Only the fields the aggregation
/// pipeline consumes are kept; the rest of the payload is ignored. A missing
/// required field is a validation failure at the network boundary.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketCoin {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub current_price: Option<f64>,
}

/// One row of the `/exchanges` ranking.
#[derive(Debug, Clone, Deserialize)]
pub struct Exchange {
    pub id: String,
    pub name: String,
}

/// Raw ticker as returned by `/coins/{id}/tickers`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTicker {
    pub base: String,
    pub target: String,
    pub last: f64,
    pub coin_id: String,
    pub market: TickerMarket,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TickerMarket {
    pub identifier: String,
}

/// Body of one tickers page response.
#[derive(Debug, Clone, Deserialize)]
pub struct TickersPage {
    pub tickers: Vec<RawTicker>,
}
