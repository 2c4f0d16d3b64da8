//! Query modules for the portfolio store.
//!
//! Each module provides a query struct that borrows from a
//! [`Connection`](crate::connection::Connection) and exposes methods
//! returning `Result<T>` with model payloads.

pub mod accounts;
pub mod holdings;

pub use accounts::AccountQuery;
pub use holdings::HoldingQuery;
