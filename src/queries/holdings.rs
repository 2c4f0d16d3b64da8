//! Holding storage against the `holdings` table.

use tracing::info;

use crate::connection::Connection;
use crate::error::{CoinfolioError, Result};
use crate::models::{Holding, NewHolding};
use crate::sql_builder::SqlBuilder;

// ---------------------------------------------------------------------------
// HoldingQuery
// ---------------------------------------------------------------------------

/// Query interface for the holdings owned by accounts.
pub struct HoldingQuery<'a> {
    conn: &'a Connection,
}

impl<'a> HoldingQuery<'a> {
    /// Create a new `HoldingQuery` bound to the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Record a holding for `user_id`.
    ///
    /// The coin string is stored exactly as given; it is resolved to a
    /// provider id only when the portfolio is valued.
    pub fn add(&self, user_id: i64, holding: &NewHolding) -> Result<Holding> {
        if holding.coin.trim().is_empty() {
            return Err(CoinfolioError::InvalidArgument(
                "coin must not be empty".into(),
            ));
        }
        if !holding.amount.is_finite() || !holding.buy_price.is_finite() {
            return Err(CoinfolioError::InvalidArgument(
                "amount and buy_price must be finite numbers".into(),
            ));
        }
        let owner = self
            .conn
            .execute_scalar("SELECT id FROM accounts WHERE id = ?", &[user_id.to_string()])?;
        if owner.is_none() {
            return Err(CoinfolioError::NotFound(format!("account {}", user_id)));
        }

        let id: i64 = self.conn.raw().query_row(
            "INSERT INTO holdings (user_id, coin, amount, buy_price) \
             VALUES (?, ?, ?, ?) RETURNING id",
            duckdb::params![user_id, holding.coin, holding.amount, holding.buy_price],
            |row| row.get(0),
        )?;
        info!(holding_id = id, user_id, coin = %holding.coin, "holding added");

        Ok(Holding {
            id,
            user_id,
            coin: holding.coin.clone(),
            amount: holding.amount,
            buy_price: holding.buy_price,
        })
    }

    /// All holdings of `user_id`, oldest first.
    pub fn list_for_user(&self, user_id: i64) -> Result<Vec<Holding>> {
        let (sql, params) = SqlBuilder::new("holdings")
            .where_eq("user_id", &user_id.to_string())
            .order_by(&["id ASC"])
            .build();
        self.conn.execute_into(&sql, &params)
    }

    /// Number of holdings recorded for `user_id`.
    pub fn count_for_user(&self, user_id: i64) -> Result<i64> {
        let (sql, params) = SqlBuilder::new("holdings")
            .select(&["COUNT(*) AS n"])
            .where_eq("user_id", &user_id.to_string())
            .build();
        let count = self.conn.execute_scalar(&sql, &params)?;
        Ok(count.and_then(|v| v.as_i64()).unwrap_or(0))
    }
}
