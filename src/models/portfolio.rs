use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// HoldingValuation — One holding priced at the current quote
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingValuation {
    pub coin: String,
    pub amount: f64,
    pub buy_price: f64,
    pub current_price: f64,
    pub value: f64,
    pub cost: f64,
    pub profit_loss: f64,
}

// ---------------------------------------------------------------------------
// PortfolioSummary — Dashboard figures for one account
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub holdings: Vec<HoldingValuation>,
    pub total_value: f64,
    pub total_cost: f64,
    pub total_profit_loss: f64,
    pub chart_labels: Vec<String>,
    pub chart_values: Vec<f64>,
}
