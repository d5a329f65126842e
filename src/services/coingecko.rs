use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::error::PriceError;
use crate::models::market::{Exchange, MarketCoin, RawTicker, TickersPage};
use crate::services::market_data::MarketDataProvider;

const VS_CURRENCY: &str = "usd";

#[derive(Clone)]
pub struct CoinGeckoService {
    client: Client,
    api_key: String,
    base_url: String,
}

impl CoinGeckoService {
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> Result<Self, PriceError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key,
            base_url,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, PriceError> {
        tracing::debug!("GET {url}");

        let response = self
            .client
            .get(url)
            .header("accept", "application/json")
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PriceError::Api { status, body });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|err| {
            PriceError::Validation(format!("unexpected response shape from {url}: {err}"))
        })
    }
}

#[async_trait]
impl MarketDataProvider for CoinGeckoService {
    /// Top cryptocurrencies by market cap. Ranked against USD since the API
    /// mostly supports fiat quote currencies and USDT is pegged to it.
    async fn fetch_top_coins(&self, count: usize) -> Result<Vec<MarketCoin>, PriceError> {
        let url = format!("{}/coins/markets", self.base_url);
        let query = [
            ("vs_currency", VS_CURRENCY.to_string()),
            ("order", "market_cap_desc".to_string()),
            ("per_page", count.to_string()),
            ("page", "1".to_string()),
            ("x_cg_demo_api_key", self.api_key.clone()),
        ];

        self.get_json(&url, &query).await
    }

    async fn fetch_top_exchanges(&self, count: usize) -> Result<Vec<Exchange>, PriceError> {
        let url = format!("{}/exchanges", self.base_url);
        let query = [
            ("per_page", count.to_string()),
            ("page", "1".to_string()),
            ("x_cg_demo_api_key", self.api_key.clone()),
        ];

        self.get_json(&url, &query).await
    }

    async fn fetch_tickers_page(
        &self,
        exchange_ids: &[String],
        coin_id: &str,
        page: u32,
    ) -> Result<Vec<RawTicker>, PriceError> {
        let url = format!("{}/coins/{}/tickers", self.base_url, coin_id);
        let query = [
            ("exchange_ids", exchange_ids.join(",")),
            ("page", page.to_string()),
            ("x_cg_demo_api_key", self.api_key.clone()),
        ];

        let page: TickersPage = self.get_json(&url, &query).await?;
        Ok(page.tickers)
    }
}
