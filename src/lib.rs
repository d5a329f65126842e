// src/lib.rs

use services::prices::PriceService;

#[derive(Clone)]
pub struct AppState {
    pub prices: PriceService,
}

pub mod entities {
    pub mod records;
}

pub mod services {
    pub mod aggregation;
    pub mod coingecko;
    pub mod market_data;
    pub mod prices;
}

pub mod config;
pub mod error;
pub mod handlers;
pub mod jobs;
pub mod models;
pub mod store;
