//! Async wrapper around [`Coinfolio`] for use in async runtimes (Tokio, etc.).
//!
//! Store access and price requests are blocking, so every operation runs on
//! the blocking thread pool via [`tokio::task::spawn_blocking`], keeping the
//! async event loop free.
//!
//! # Example
//!
//! ```no_run
//! use coinfolio::AsyncCoinfolio;
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = AsyncCoinfolio::builder().in_memory().build().await.unwrap();
//!     let account = app.register("alice", "hunter2").await.unwrap();
//!     let summary = app.dashboard(account.id).await.unwrap();
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::{self, Settings};
use crate::error::{CoinfolioError, Result};
use crate::models::{Account, Holding, NewHolding, PortfolioSummary};
use crate::quote::QuoteClient;
use crate::{valuation, AliasResolver, Coinfolio};

// ---------------------------------------------------------------------------
// AsyncCoinfolioBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing an [`AsyncCoinfolio`] instance.
pub struct AsyncCoinfolioBuilder {
    database_path: Option<PathBuf>,
    price_api_base: String,
    timeout: Duration,
    aliases: Option<AliasResolver>,
}

impl Default for AsyncCoinfolioBuilder {
    fn default() -> Self {
        Self {
            database_path: Some(config::default_database_path()),
            price_api_base: config::PRICE_API_BASE.to_string(),
            timeout: config::DEFAULT_TIMEOUT,
            aliases: None,
        }
    }
}

impl AsyncCoinfolioBuilder {
    /// Take database path, provider URL and timeout from loaded [`Settings`].
    pub fn from_settings(settings: &Settings) -> Self {
        Self::default()
            .database_path(&settings.database_path)
            .price_api_base(&settings.price_api_base)
            .timeout(settings.timeout)
    }

    pub fn database_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.database_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn in_memory(mut self) -> Self {
        self.database_path = None;
        self
    }

    pub fn price_api_base(mut self, base: &str) -> Self {
        self.price_api_base = base.to_string();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn aliases(mut self, resolver: AliasResolver) -> Self {
        self.aliases = Some(resolver);
        self
    }

    /// Build the async wrapper.
    ///
    /// Initialization runs on the blocking thread pool so it won't block
    /// the async event loop.
    pub async fn build(self) -> Result<AsyncCoinfolio> {
        tokio::task::spawn_blocking(move || {
            let mut builder = Coinfolio::builder()
                .price_api_base(&self.price_api_base)
                .timeout(self.timeout);
            builder = match self.database_path {
                Some(path) => builder.database_path(path),
                None => builder.in_memory(),
            };
            if let Some(resolver) = self.aliases {
                builder = builder.aliases(resolver);
            }
            let app = builder.build()?;
            Ok(AsyncCoinfolio {
                quotes: app.shared_quotes(),
                inner: Arc::new(Mutex::new(app)),
            })
        })
        .await
        .map_err(|e| CoinfolioError::InvalidArgument(format!("Task join error: {e}")))?
    }
}

// ---------------------------------------------------------------------------
// AsyncCoinfolio
// ---------------------------------------------------------------------------

/// Async wrapper around [`Coinfolio`].
///
/// The underlying [`Coinfolio`] sits behind a [`Mutex`]: the DuckDB
/// connection is not `Sync`, so store operations are serialized. Price
/// requests go through a separate handle and never hold that lock.
#[derive(Clone)]
pub struct AsyncCoinfolio {
    inner: Arc<Mutex<Coinfolio>>,
    quotes: Arc<QuoteClient>,
}

impl AsyncCoinfolio {
    /// Create a new builder for configuring the async wrapper.
    pub fn builder() -> AsyncCoinfolioBuilder {
        AsyncCoinfolioBuilder::default()
    }

    /// Run a sync operation on the blocking thread pool.
    ///
    /// The store lock is held for the whole closure, so keep price requests
    /// out of it.
    ///
    /// ```no_run
    /// # use coinfolio::AsyncCoinfolio;
    /// # async fn example() -> coinfolio::Result<()> {
    /// # let app = AsyncCoinfolio::builder().in_memory().build().await?;
    /// let id = app.run(|a| Ok(a.resolver().resolve("btc"))).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Coinfolio) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let app = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = app
                .lock()
                .map_err(|_| CoinfolioError::InvalidArgument("Coinfolio lock poisoned".into()))?;
            f(&guard)
        })
        .await
        .map_err(|e| CoinfolioError::InvalidArgument(format!("Task join error: {e}")))?
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<Account> {
        let username = username.to_string();
        let password = password.to_string();
        self.run(move |a| a.accounts().register(&username, &password))
            .await
    }

    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Option<Account>> {
        let username = username.to_string();
        let password = password.to_string();
        self.run(move |a| a.accounts().authenticate(&username, &password))
            .await
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<Account> {
        let username = username.to_string();
        let password = password.to_string();
        self.run(move |a| a.accounts().login(&username, &password))
            .await
    }

    pub async fn add_holding(&self, user_id: i64, holding: NewHolding) -> Result<Holding> {
        self.run(move |a| a.holdings().add(user_id, &holding)).await
    }

    /// Value every holding of `user_id` at current prices.
    ///
    /// Holdings are read under the store lock; the price request runs after
    /// it is released, so a slow provider does not stall other callers.
    pub async fn dashboard(&self, user_id: i64) -> Result<PortfolioSummary> {
        let holdings = self
            .run(move |a| a.holdings().list_for_user(user_id))
            .await?;
        let quotes = Arc::clone(&self.quotes);
        tokio::task::spawn_blocking(move || valuation::value_at_market(&quotes, &holdings))
            .await
            .map_err(|e| CoinfolioError::InvalidArgument(format!("Task join error: {e}")))
    }

    /// Short description of the wrapped instance (database, provider).
    pub async fn describe(&self) -> Result<String> {
        self.run(|a| Ok(a.to_string())).await
    }
}
