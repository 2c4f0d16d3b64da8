use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{CoinfolioError, Result};

pub const PRICE_API_BASE: &str = "https://api.coingecko.com/api/v3";
pub const SIMPLE_PRICE_PATH: &str = "simple/price";
pub const QUOTE_CURRENCY: &str = "usd";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_PORT: u16 = 5000;
pub const SESSION_COOKIE: &str = "coinfolio_session";

/// Built-in mapping from user-facing symbols and names to CoinGecko ids.
pub fn default_aliases() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("btc", "bitcoin"),
        ("bitcoin", "bitcoin"),
        ("eth", "ethereum"),
        ("ethereum", "ethereum"),
        ("doge", "dogecoin"),
        ("dogecoin", "dogecoin"),
        ("ada", "cardano"),
        ("cardano", "cardano"),
        ("sol", "solana"),
        ("solana", "solana"),
        ("dot", "polkadot"),
        ("polkadot", "polkadot"),
        ("matic", "matic-network"),
        ("polygon", "matic-network"),
        ("bnb", "binancecoin"),
        ("binance", "binancecoin"),
        ("xrp", "ripple"),
        ("ripple", "ripple"),
        ("ltc", "litecoin"),
        ("litecoin", "litecoin"),
        ("usdt", "tether"),
        ("tether", "tether"),
        ("usdc", "usd-coin"),
        ("avax", "avalanche-2"),
        ("avalanche", "avalanche-2"),
        ("link", "chainlink"),
        ("chainlink", "chainlink"),
    ])
}

pub fn default_database_path() -> PathBuf {
    if let Some(data) = dirs::data_dir() {
        data.join("coinfolio").join("portfolio.duckdb")
    } else {
        PathBuf::from("portfolio.duckdb")
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Process configuration, read once at startup and passed to constructors.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub port: u16,
    pub database_path: PathBuf,
    pub price_api_base: String,
    pub timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_path: default_database_path(),
            price_api_base: PRICE_API_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Settings {
    /// Load settings from the process environment, reading `.env` first
    /// when one is present.
    ///
    /// Recognized variables: `PORT`, `COINFOLIO_DB`, `COINFOLIO_PRICE_API`
    /// and `COINFOLIO_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup. Unset or empty keys fall
    /// back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut settings = Settings::default();

        if let Some(port) = get("PORT") {
            settings.port = port.trim().parse().map_err(|_| {
                CoinfolioError::InvalidArgument(format!("PORT is not a valid port: {}", port))
            })?;
        }
        if let Some(path) = get("COINFOLIO_DB") {
            settings.database_path = PathBuf::from(path);
        }
        if let Some(base) = get("COINFOLIO_PRICE_API") {
            settings.price_api_base = base.trim_end_matches('/').to_string();
        }
        if let Some(secs) = get("COINFOLIO_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                CoinfolioError::InvalidArgument(format!(
                    "COINFOLIO_TIMEOUT_SECS is not a whole number of seconds: {}",
                    secs
                ))
            })?;
            settings.timeout = Duration::from_secs(secs);
        }

        Ok(settings)
    }
}
