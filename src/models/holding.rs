use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Holding — One purchase lot owned by an account
// ---------------------------------------------------------------------------

/// One purchase lot. `coin` is stored as entered, not normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub id: i64,
    pub user_id: i64,
    pub coin: String,
    pub amount: f64,
    pub buy_price: f64,
}

// ---------------------------------------------------------------------------
// NewHolding — Input for adding a holding
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewHolding {
    pub coin: String,
    pub amount: f64,
    pub buy_price: f64,
}
