use std::env;

use thiserror::Error;

const DEFAULT_COINGECKO_BASE_URL: &str = "https://api.coingecko.com/api/v3";
const DEFAULT_DATABASE_URL: &str = "sqlite://pricewatch.db?mode=rwc";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_JOB_INTERVAL_SECS: u64 = 60;
const DEFAULT_HTTP_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value {value:?} for environment variable {name}")]
    Invalid { name: &'static str, value: String },
}

/// Runtime configuration, loaded once at startup. Every knob comes from the
/// environment (a `.env` file is honored) and is validated before any
/// service is built.
#[derive(Debug, Clone)]
pub struct Config {
    pub coingecko_api_key: String,
    pub coingecko_base_url: String,
    pub database_url: String,
    pub bind_addr: String,
    pub job_interval_secs: u64,
    pub http_timeout_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            coingecko_api_key: require("COINGECKO_API_KEY")?,
            coingecko_base_url: env::var("COINGECKO_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_COINGECKO_BASE_URL.to_string()),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            bind_addr: env::var("RPC_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            job_interval_secs: parse_positive("PRICES_JOB_INTERVAL_SECS", DEFAULT_JOB_INTERVAL_SECS)?,
            http_timeout_ms: parse_positive("HTTP_TIMEOUT_MS", DEFAULT_HTTP_TIMEOUT_MS)?,
        })
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    let value = env::var(name).map_err(|_| ConfigError::Missing(name))?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Missing(name));
    }
    Ok(trimmed.to_string())
}

fn parse_positive(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    let Ok(raw) = env::var(name) else {
        return Ok(default);
    };
    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ConfigError::Invalid { name, value: raw }),
    }
}
