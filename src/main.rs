use std::sync::Arc;
use std::time::Duration;

use sea_orm::Database;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pricewatch_backend::config::Config;
use pricewatch_backend::handlers::rpc::rpc_router;
use pricewatch_backend::jobs::prices_sync::start_prices_sync_job;
use pricewatch_backend::services::coingecko::CoinGeckoService;
use pricewatch_backend::services::prices::PriceService;
use pricewatch_backend::store::{self, TimeSeriesStore};
use pricewatch_backend::AppState;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,pricewatch_backend=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().expect("Invalid environment configuration");

    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Running migrations...");
    store::run_migrations(&db)
        .await
        .expect("Failed to run migrations");

    let coingecko = CoinGeckoService::new(
        config.coingecko_api_key.clone(),
        config.coingecko_base_url.clone(),
        Duration::from_millis(config.http_timeout_ms),
    )
    .expect("Failed to build CoinGecko client");

    let store = TimeSeriesStore::new(db);
    let prices = PriceService::new(Arc::new(coingecko), store);

    start_prices_sync_job(prices.clone(), config.job_interval_secs);
    tracing::info!(
        "Price update scheduler started (every {}s)",
        config.job_interval_secs
    );

    let state = AppState { prices };
    let app = rpc_router(state).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind RPC listener");

    tracing::info!("RPC server listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
