//! Coinfolio: a crypto portfolio tracker.
//!
//! Accounts and holdings are stored in DuckDB. Live USD prices come from the
//! CoinGecko `simple/price` endpoint; user-entered coin symbols are mapped to
//! provider ids by an [`AliasResolver`] at valuation time.
//!
//! # Quick start
//!
//! ```no_run
//! use coinfolio::{Coinfolio, NewHolding};
//!
//! let app = Coinfolio::builder().in_memory().build().unwrap();
//!
//! let account = app.accounts().register("alice", "hunter2").unwrap();
//! app.holdings()
//!     .add(account.id, &NewHolding { coin: "btc".into(), amount: 0.5, buy_price: 30000.0 })
//!     .unwrap();
//!
//! let summary = app.dashboard(account.id).unwrap();
//! println!("total value: {}", summary.total_value);
//! ```

pub mod alias;
#[cfg(feature = "async")]
pub mod async_client;
pub mod config;
pub mod connection;
pub mod error;
pub mod models;
pub mod queries;
pub mod quote;
pub mod sql_builder;
pub mod valuation;

pub use alias::AliasResolver;
#[cfg(feature = "async")]
pub use async_client::AsyncCoinfolio;
pub use config::Settings;
pub use connection::Connection;
pub use error::{CoinfolioError, Result};
pub use models::*;
pub use quote::{Quote, QuoteClient, Unavailable};
pub use sql_builder::SqlBuilder;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

// ---------------------------------------------------------------------------
// CoinfolioBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`Coinfolio`] instance.
///
/// Use [`Coinfolio::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](CoinfolioBuilder::build).
pub struct CoinfolioBuilder {
    database_path: Option<PathBuf>,
    price_api_base: String,
    timeout: Duration,
    aliases: Option<AliasResolver>,
}

impl Default for CoinfolioBuilder {
    fn default() -> Self {
        Self {
            database_path: Some(config::default_database_path()),
            price_api_base: config::PRICE_API_BASE.to_string(),
            timeout: config::DEFAULT_TIMEOUT,
            aliases: None,
        }
    }
}

impl CoinfolioBuilder {
    /// Take database path, provider URL and timeout from loaded [`Settings`].
    pub fn from_settings(settings: &Settings) -> Self {
        Self::default()
            .database_path(&settings.database_path)
            .price_api_base(&settings.price_api_base)
            .timeout(settings.timeout)
    }

    /// Store data in the given DuckDB file.
    ///
    /// Defaults to `portfolio.duckdb` under the platform data directory.
    pub fn database_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.database_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Keep everything in an in-memory database that is lost on drop.
    pub fn in_memory(mut self) -> Self {
        self.database_path = None;
        self
    }

    /// Base URL of the price API. Defaults to CoinGecko's public v3 API.
    pub fn price_api_base(mut self, base: &str) -> Self {
        self.price_api_base = base.to_string();
        self
    }

    /// Timeout for price requests. Defaults to 10 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replace the built-in alias table.
    pub fn aliases(mut self, resolver: AliasResolver) -> Self {
        self.aliases = Some(resolver);
        self
    }

    /// Open the store and build the quote client.
    pub fn build(self) -> Result<Coinfolio> {
        let conn = match &self.database_path {
            Some(path) => Connection::open(path)?,
            None => Connection::open_in_memory()?,
        };
        let resolver = self.aliases.unwrap_or_default();
        let quotes = QuoteClient::new(&self.price_api_base, self.timeout, resolver)?;
        Ok(Coinfolio {
            conn,
            quotes: Arc::new(quotes),
            database_path: self.database_path,
        })
    }
}

// ---------------------------------------------------------------------------
// Coinfolio
// ---------------------------------------------------------------------------

/// The main entry point: owns the store connection and the quote client.
///
/// Created via [`Coinfolio::builder()`].
pub struct Coinfolio {
    conn: Connection,
    quotes: Arc<QuoteClient>,
    database_path: Option<PathBuf>,
}

impl Coinfolio {
    /// Create a new builder.
    pub fn builder() -> CoinfolioBuilder {
        CoinfolioBuilder::default()
    }

    /// Access the account query interface.
    pub fn accounts(&self) -> queries::AccountQuery<'_> {
        queries::AccountQuery::new(&self.conn)
    }

    /// Access the holding query interface.
    pub fn holdings(&self) -> queries::HoldingQuery<'_> {
        queries::HoldingQuery::new(&self.conn)
    }

    /// The price client.
    pub fn quotes(&self) -> &QuoteClient {
        &self.quotes
    }

    /// A shared handle to the price client, usable without borrowing `self`.
    pub fn shared_quotes(&self) -> Arc<QuoteClient> {
        Arc::clone(&self.quotes)
    }

    /// The alias resolver shared with the price client.
    pub fn resolver(&self) -> &AliasResolver {
        self.quotes.resolver()
    }

    /// Value every holding of `user_id` at current prices.
    ///
    /// Issues at most one batch price request; none when the account holds
    /// nothing. Unavailable prices count as zero.
    pub fn dashboard(&self, user_id: i64) -> Result<PortfolioSummary> {
        let holdings = self.holdings().list_for_user(user_id)?;
        debug!(user_id, holdings = holdings.len(), "valuing portfolio");
        Ok(valuation::value_at_market(&self.quotes, &holdings))
    }

    /// Return a reference to the underlying [`Connection`].
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl fmt::Display for Coinfolio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let db = match &self.database_path {
            Some(path) => path.display().to_string(),
            None => ":memory:".to_string(),
        };
        write!(
            f,
            "Coinfolio(database={}, price_api={}, aliases={})",
            db,
            self.quotes.endpoint(),
            self.quotes.resolver().len()
        )
    }
}
