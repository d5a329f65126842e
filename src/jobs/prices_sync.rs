use tokio::time::{interval, Duration};

use crate::services::prices::PriceService;

/// Spawns the periodic price update loop. A failed cycle is logged and the
/// loop waits for the next tick; retry policy stays with the operator.
pub fn start_prices_sync_job(prices: PriceService, interval_secs: u64) {
    tokio::spawn(async move {
        let mut interval = interval(Duration::from_secs(interval_secs));

        loop {
            interval.tick().await;
            tracing::info!("Running scheduled price update");

            match prices.fetch_and_store().await {
                Ok(()) => tracing::info!("Prices updated successfully"),
                Err(err) => tracing::error!("Error updating prices: {err}"),
            }
        }
    });
}
