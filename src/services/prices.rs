use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info};

use crate::error::PriceError;
use crate::models::prices::{HistoricalEntry, LatestPointer, PriceSnapshot, Ticker};
use crate::services::aggregation::{aggregate_prices, normalize_tickers};
use crate::services::market_data::MarketDataProvider;
use crate::store::{snapshot_key, parse_snapshot_key, TimeSeriesStore, LATEST_KEY};

/// How many top-ranked coins and exchanges one snapshot covers.
const TOP_COINS_COUNT: usize = 5;
const TOP_EXCHANGES_COUNT: usize = 3;

/// Ceiling on ticker pages fetched per coin. The tickers endpoint paginates
/// without an upfront total, so termination normally comes from the first
/// empty page; past this many pages the fetch fails instead of looping.
const MAX_TICKER_PAGES: u32 = 20;

/// Orchestrates fetch -> normalize -> aggregate -> dedup -> store, and
/// answers latest/historical queries from the store.
#[derive(Clone)]
pub struct PriceService {
    provider: Arc<dyn MarketDataProvider>,
    store: TimeSeriesStore,
}

impl PriceService {
    pub fn new(provider: Arc<dyn MarketDataProvider>, store: TimeSeriesStore) -> Self {
        Self { provider, store }
    }

    /// Builds a candidate snapshot for `timestamp` from live market data.
    /// Any provider failure aborts the whole pass; nothing is persisted.
    pub async fn build_snapshot(&self, timestamp: i64) -> Result<PriceSnapshot, PriceError> {
        let coins = self.provider.fetch_top_coins(TOP_COINS_COUNT).await?;
        let coin_ids: Vec<String> = coins.into_iter().map(|coin| coin.id).collect();

        let exchanges = self.provider.fetch_top_exchanges(TOP_EXCHANGES_COUNT).await?;
        let exchange_ids: Vec<String> = exchanges.into_iter().map(|exchange| exchange.id).collect();

        let mut tickers: Vec<Ticker> = Vec::new();

        for coin_id in &coin_ids {
            let mut page = 1;
            loop {
                if page > MAX_TICKER_PAGES {
                    return Err(PriceError::PaginationExceeded {
                        coin_id: coin_id.clone(),
                        max_pages: MAX_TICKER_PAGES,
                    });
                }

                let raw = self
                    .provider
                    .fetch_tickers_page(&exchange_ids, coin_id, page)
                    .await?;
                if raw.is_empty() {
                    break;
                }

                tickers.extend(normalize_tickers(raw, &coin_ids, &exchange_ids));
                page += 1;
            }
        }

        Ok(aggregate_prices(&tickers, timestamp))
    }

    /// Fetches a fresh snapshot and stores it, unless its price content is
    /// identical to the snapshot `latest` already points at.
    pub async fn fetch_and_store(&self) -> Result<(), PriceError> {
        self.fetch_and_store_at(Utc::now().timestamp_millis())
            .await
            .inspect_err(|err| error!("Failed to fetch and store prices: {err}"))
    }

    pub async fn fetch_and_store_at(&self, timestamp: i64) -> Result<(), PriceError> {
        let snapshot = self.build_snapshot(timestamp).await?;

        let latest = self.get_latest().await?;
        if let Some(previous) = &latest {
            if prices_unchanged(previous, &snapshot) {
                info!("No price change detected, skipping storage");
                return Ok(());
            }
        }

        // The record and the pointer go in one transaction so a crash can
        // never leave `latest` referencing a missing or stale record.
        let key = snapshot_key(timestamp);
        let pointer = LatestPointer { key: key.clone() };
        self.store
            .batch_write(vec![
                (key, serde_json::to_value(&snapshot)?),
                (LATEST_KEY.to_string(), serde_json::to_value(&pointer)?),
            ])
            .await?;

        info!("Stored new price snapshot at timestamp {timestamp}");
        Ok(())
    }

    /// Resolves the `latest` pointer and dereferences it. `None` until the
    /// first snapshot has been stored.
    pub async fn get_latest(&self) -> Result<Option<PriceSnapshot>, PriceError> {
        let Some(raw) = self.store.get(LATEST_KEY).await? else {
            return Ok(None);
        };
        let pointer: LatestPointer = serde_json::from_value(raw)?;

        let Some(value) = self.store.get(&pointer.key).await? else {
            return Ok(None);
        };

        Ok(Some(serde_json::from_value(value)?))
    }

    /// All snapshots with `from <= timestamp <= to` (both ms), ascending.
    /// Rejects `from >= to` before touching the store.
    pub async fn get_historical(
        &self,
        from: i64,
        to: i64,
    ) -> Result<Vec<HistoricalEntry>, PriceError> {
        if from >= to {
            return Err(PriceError::InvalidRange { from, to });
        }

        let rows = self
            .store
            .scan_range(&snapshot_key(from), &snapshot_key(to))
            .await?;

        let mut entries = Vec::with_capacity(rows.len());
        for (key, value) in rows {
            let timestamp = parse_snapshot_key(&key).ok_or_else(|| {
                PriceError::Validation(format!("malformed snapshot key in store: {key}"))
            })?;
            entries.push(HistoricalEntry {
                timestamp,
                data: serde_json::from_value(value)?,
            });
        }

        Ok(entries)
    }
}

/// Structural comparison of the price content of two snapshots: coin set,
/// formatted averages and per-exchange breakdowns. The per-entry capture
/// timestamp is ignored, otherwise no two snapshots could ever be equal and
/// every cycle would append a record.
fn prices_unchanged(previous: &PriceSnapshot, candidate: &PriceSnapshot) -> bool {
    previous.len() == candidate.len()
        && previous.iter().all(|(coin_id, prev)| {
            candidate.get(coin_id).is_some_and(|next| {
                prev.price == next.price && prev.exchanges == next.exchanges
            })
        })
}

#[cfg(test)]
mod tests {
    use crate::models::prices::{CoinPrice, ExchangeQuote};

    use super::*;

    fn entry(timestamp: i64, price: &str, exchanges: &[(&str, f64)]) -> CoinPrice {
        CoinPrice {
            timestamp,
            price: price.to_string(),
            exchanges: exchanges
                .iter()
                .map(|(exchange, price)| ExchangeQuote {
                    exchange: exchange.to_string(),
                    price: *price,
                })
                .collect(),
        }
    }

    #[test]
    fn equal_price_content_is_unchanged_despite_new_timestamps() {
        let mut previous = PriceSnapshot::new();
        previous.insert("bitcoin".to_string(), entry(1_000, "61000.00", &[("binance", 61000.0)]));
        let mut candidate = PriceSnapshot::new();
        candidate.insert("bitcoin".to_string(), entry(2_000, "61000.00", &[("binance", 61000.0)]));

        assert!(prices_unchanged(&previous, &candidate));
    }

    #[test]
    fn single_exchange_price_change_is_detected() {
        let mut previous = PriceSnapshot::new();
        previous.insert(
            "bitcoin".to_string(),
            entry(1_000, "61000.00", &[("binance", 60000.0), ("bybit_spot", 62000.0)]),
        );
        // Same rounded average, different per-exchange breakdown.
        let mut candidate = PriceSnapshot::new();
        candidate.insert(
            "bitcoin".to_string(),
            entry(2_000, "61000.00", &[("binance", 62000.0), ("bybit_spot", 60000.0)]),
        );

        assert!(!prices_unchanged(&previous, &candidate));
    }

    #[test]
    fn coin_set_changes_are_detected() {
        let mut previous = PriceSnapshot::new();
        previous.insert("bitcoin".to_string(), entry(1_000, "61000.00", &[("binance", 61000.0)]));
        let mut candidate = previous.clone();
        candidate.insert("ethereum".to_string(), entry(1_000, "4350.00", &[("binance", 4350.0)]));

        assert!(!prices_unchanged(&previous, &candidate));
    }
}
