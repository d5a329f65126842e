use async_trait::async_trait;

use crate::error::PriceError;
use crate::models::market::{Exchange, MarketCoin, RawTicker};

/// Market-data capability consumed by the snapshot service: asset and
/// exchange rankings plus paged cross-exchange tickers. Implemented by the
/// CoinGecko client; tests substitute a stub.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn fetch_top_coins(&self, count: usize) -> Result<Vec<MarketCoin>, PriceError>;

    async fn fetch_top_exchanges(&self, count: usize) -> Result<Vec<Exchange>, PriceError>;

    /// Fetches one page of tickers for `coin_id` across the given exchanges.
    /// An empty page signals the end of pagination.
    async fn fetch_tickers_page(
        &self,
        exchange_ids: &[String],
        coin_id: &str,
        page: u32,
    ) -> Result<Vec<RawTicker>, PriceError>;
}
