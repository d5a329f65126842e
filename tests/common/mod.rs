use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use sea_orm::{ConnectOptions, Database};

use pricewatch_backend::error::PriceError;
use pricewatch_backend::models::market::{Exchange, MarketCoin, RawTicker, TickerMarket};
use pricewatch_backend::services::market_data::MarketDataProvider;
use pricewatch_backend::store::{self, TimeSeriesStore};

/// Set up a store over an in-memory SQLite database. A single pooled
/// connection keeps every handle on the same memory database.
pub async fn setup_test_store() -> TimeSeriesStore {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1);

    let db = Database::connect(options)
        .await
        .expect("connect to in-memory sqlite");
    store::run_migrations(&db).await.expect("run migrations");

    TimeSeriesStore::new(db)
}

pub fn ticker(coin_id: &str, base: &str, exchange: &str, last: f64) -> RawTicker {
    RawTicker {
        base: base.to_string(),
        target: "USDT".to_string(),
        last,
        coin_id: coin_id.to_string(),
        market: TickerMarket {
            identifier: exchange.to_string(),
        },
    }
}

fn market_coin(id: &str, symbol: &str, name: &str, current_price: f64) -> MarketCoin {
    MarketCoin {
        id: id.to_string(),
        symbol: symbol.to_string(),
        name: name.to_string(),
        current_price: Some(current_price),
    }
}

fn exchange(id: &str, name: &str) -> Exchange {
    Exchange {
        id: id.to_string(),
        name: name.to_string(),
    }
}

/// Stub market-data provider. Rankings mirror the live API's top coins and
/// exchanges; ticker pages are set per (coin, page) and unset pages are
/// empty, which terminates pagination.
#[derive(Default)]
pub struct StubProvider {
    pages: Mutex<HashMap<(String, u32), Vec<RawTicker>>>,
    endless: bool,
}

impl StubProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider that never returns an empty tickers page.
    #[allow(dead_code)]
    pub fn endless() -> Self {
        Self {
            endless: true,
            ..Self::default()
        }
    }

    pub fn set_page(&self, coin_id: &str, page: u32, tickers: Vec<RawTicker>) {
        self.pages
            .lock()
            .expect("stub pages lock")
            .insert((coin_id.to_string(), page), tickers);
    }
}

#[async_trait]
impl MarketDataProvider for StubProvider {
    async fn fetch_top_coins(&self, count: usize) -> Result<Vec<MarketCoin>, PriceError> {
        let coins = vec![
            market_coin("bitcoin", "btc", "Bitcoin", 60000.0),
            market_coin("ethereum", "eth", "Ethereum", 4200.0),
            market_coin("ripple", "xrp", "XRP", 1.5),
        ];
        Ok(coins.into_iter().take(count).collect())
    }

    async fn fetch_top_exchanges(&self, count: usize) -> Result<Vec<Exchange>, PriceError> {
        let exchanges = vec![
            exchange("binance", "Binance"),
            exchange("bybit_spot", "Bybit"),
            exchange("coinbase", "Coinbase"),
        ];
        Ok(exchanges.into_iter().take(count).collect())
    }

    async fn fetch_tickers_page(
        &self,
        _exchange_ids: &[String],
        coin_id: &str,
        page: u32,
    ) -> Result<Vec<RawTicker>, PriceError> {
        if self.endless {
            return Ok(vec![ticker(coin_id, "BTC", "binance", 61000.0)]);
        }

        Ok(self
            .pages
            .lock()
            .expect("stub pages lock")
            .get(&(coin_id.to_string(), page))
            .cloned()
            .unwrap_or_default())
    }
}

/// Provider whose ranking fetch always fails, for asserting that a failed
/// pass persists nothing.
#[allow(dead_code)]
pub struct FailingProvider;

#[async_trait]
impl MarketDataProvider for FailingProvider {
    async fn fetch_top_coins(&self, _count: usize) -> Result<Vec<MarketCoin>, PriceError> {
        Err(PriceError::Validation("coingecko api down".to_string()))
    }

    async fn fetch_top_exchanges(&self, _count: usize) -> Result<Vec<Exchange>, PriceError> {
        Err(PriceError::Validation("coingecko api down".to_string()))
    }

    async fn fetch_tickers_page(
        &self,
        _exchange_ids: &[String],
        _coin_id: &str,
        _page: u32,
    ) -> Result<Vec<RawTicker>, PriceError> {
        Err(PriceError::Validation("coingecko api down".to_string()))
    }
}
