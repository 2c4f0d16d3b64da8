//! Account registration and login against the `accounts` table.
//!
//! Credentials are stored and compared in plaintext. This mirrors the system
//! this store replaces and is a known vulnerability: switch to a salted
//! one-way password hash before exposing the service to real users.

use tracing::{debug, info};

use crate::connection::Connection;
use crate::error::{CoinfolioError, Result};
use crate::models::Account;
use crate::sql_builder::SqlBuilder;

// ---------------------------------------------------------------------------
// AccountQuery
// ---------------------------------------------------------------------------

/// Query interface for registered accounts.
pub struct AccountQuery<'a> {
    conn: &'a Connection,
}

impl<'a> AccountQuery<'a> {
    /// Create a new `AccountQuery` bound to the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create an account.
    ///
    /// Fails with [`CoinfolioError::Conflict`] when the username is taken and
    /// [`CoinfolioError::InvalidArgument`] when either field is blank.
    pub fn register(&self, username: &str, password: &str) -> Result<Account> {
        if username.trim().is_empty() {
            return Err(CoinfolioError::InvalidArgument(
                "username must not be empty".into(),
            ));
        }
        if password.is_empty() {
            return Err(CoinfolioError::InvalidArgument(
                "password must not be empty".into(),
            ));
        }
        if self.get_by_username(username)?.is_some() {
            return Err(CoinfolioError::Conflict(format!(
                "username '{}' already exists",
                username
            )));
        }

        let id: i64 = self.conn.raw().query_row(
            "INSERT INTO accounts (username, password) VALUES (?, ?) RETURNING id",
            duckdb::params![username, password],
            |row| row.get(0),
        )?;
        info!(account_id = id, username, "account registered");

        Ok(Account {
            id,
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    /// Check a username/password pair.
    ///
    /// Returns the account on a match and `None` otherwise; an unknown
    /// username and a wrong password are not distinguished.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Option<Account>> {
        let account = self
            .get_by_username(username)?
            .filter(|account| account.password == password);
        if account.is_none() {
            debug!(username, "login rejected");
        }
        Ok(account)
    }

    /// Like [`authenticate`](Self::authenticate), but a mismatch is an
    /// [`CoinfolioError::Unauthorized`] error.
    pub fn login(&self, username: &str, password: &str) -> Result<Account> {
        self.authenticate(username, password)?.ok_or_else(|| {
            CoinfolioError::Unauthorized("invalid username or password".into())
        })
    }

    /// Get an account by id.
    pub fn get(&self, id: i64) -> Result<Option<Account>> {
        let (sql, params) = SqlBuilder::new("accounts")
            .where_eq("id", &id.to_string())
            .build();
        let mut rows: Vec<Account> = self.conn.execute_into(&sql, &params)?;
        Ok(rows.pop())
    }

    /// Get an account by its exact username.
    pub fn get_by_username(&self, username: &str) -> Result<Option<Account>> {
        let (sql, params) = SqlBuilder::new("accounts")
            .where_eq("username", username)
            .limit(1)
            .build();
        let mut rows: Vec<Account> = self.conn.execute_into(&sql, &params)?;
        Ok(rows.pop())
    }
}
