//! Pure ticker transforms: filtering raw tickers down to countable quotes
//! and averaging them into a per-coin snapshot.

use std::collections::{BTreeMap, HashSet};

use crate::models::market::RawTicker;
use crate::models::prices::{CoinPrice, ExchangeQuote, PriceSnapshot, Ticker};

/// Fixed settlement currency a ticker must be quoted in to be counted.
pub const TARGET_CURRENCY: &str = "USDT";

/// Filters raw tickers down to those quoted in [`TARGET_CURRENCY`], matching
/// a known coin and a known exchange, with a strictly positive last price.
/// Order-preserving. Tickers are not deduplicated: two quotes from the same
/// exchange for one coin both survive and both enter the average.
pub fn normalize_tickers(
    raw: Vec<RawTicker>,
    valid_coins: &[String],
    valid_exchanges: &[String],
) -> Vec<Ticker> {
    let coins: HashSet<&str> = valid_coins.iter().map(String::as_str).collect();
    let exchanges: HashSet<&str> = valid_exchanges.iter().map(String::as_str).collect();

    raw.into_iter()
        .filter(|ticker| {
            ticker.target == TARGET_CURRENCY
                && coins.contains(ticker.coin_id.as_str())
                && exchanges.contains(ticker.market.identifier.as_str())
                && ticker.last > 0.0
        })
        .map(|ticker| Ticker {
            base: ticker.base,
            target: ticker.target,
            last: ticker.last,
            coin_id: ticker.coin_id,
            exchange_id: ticker.market.identifier,
        })
        .collect()
}

/// Groups tickers by coin and computes the arithmetic mean price per group,
/// formatted to exactly two decimals. The per-exchange breakdown keeps the
/// order tickers were observed in. Coins with no surviving tickers are
/// absent from the result.
pub fn aggregate_prices(tickers: &[Ticker], timestamp: i64) -> PriceSnapshot {
    let mut groups: BTreeMap<&str, Vec<&Ticker>> = BTreeMap::new();
    for ticker in tickers {
        groups.entry(ticker.coin_id.as_str()).or_default().push(ticker);
    }

    groups
        .into_iter()
        .map(|(coin_id, group)| {
            let mean = group.iter().map(|ticker| ticker.last).sum::<f64>() / group.len() as f64;
            let exchanges = group
                .iter()
                .map(|ticker| ExchangeQuote {
                    exchange: ticker.exchange_id.clone(),
                    price: ticker.last,
                })
                .collect();

            (
                coin_id.to_string(),
                CoinPrice {
                    timestamp,
                    price: format!("{mean:.2}"),
                    exchanges,
                },
            )
        })
        .collect()
}
