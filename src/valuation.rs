//! Portfolio valuation: combines stored holdings with current quotes.
//!
//! Per-holding `value`, `cost` and `profit_loss` are rounded to cents before
//! being added to the running totals, and the totals are rounded once more at
//! the end. Over many holdings this accumulates a small rounding drift, which
//! is kept so dashboard figures match the established behavior.

use std::collections::HashMap;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::{Holding, HoldingValuation, PortfolioSummary};
use crate::quote::QuoteClient;

/// Round to 2 decimal places.
///
/// Rounds the exact binary value of `x`, so `1.115` (stored as
/// `1.11499999...`) becomes `1.11`. Exact midpoints such as `0.125` go to the
/// even cent.
pub fn round2(x: f64) -> f64 {
    Decimal::from_f64_retain(x)
        .map(|d| d.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven))
        .and_then(|d| d.to_f64())
        .unwrap_or_else(|| {
            // outside Decimal's range; cents are meaningless there anyway
            if x.is_finite() {
                (x * 100.0).round() / 100.0
            } else {
                x
            }
        })
}

/// Value one holding at `current_price`.
pub fn value_holding(holding: &Holding, current_price: f64) -> HoldingValuation {
    let value = round2(holding.amount * current_price);
    let cost = round2(holding.amount * holding.buy_price);
    let profit_loss = round2(value - cost);

    HoldingValuation {
        coin: holding.coin.clone(),
        amount: holding.amount,
        buy_price: holding.buy_price,
        current_price,
        value,
        cost,
        profit_loss,
    }
}

/// Value a whole portfolio.
///
/// `prices` is keyed by each holding's stored coin string; a holding whose
/// exact string is absent is valued at zero. Only holdings with a strictly
/// positive value appear in the chart series.
pub fn value_portfolio(holdings: &[Holding], prices: &HashMap<String, f64>) -> PortfolioSummary {
    let mut summary = PortfolioSummary::default();
    let mut total_value = 0.0;
    let mut total_cost = 0.0;

    for holding in holdings {
        let current_price = prices.get(&holding.coin).copied().unwrap_or(0.0);
        let valuation = value_holding(holding, current_price);

        total_value += valuation.value;
        total_cost += valuation.cost;

        if valuation.value > 0.0 {
            summary.chart_labels.push(holding.coin.to_uppercase());
            summary.chart_values.push(valuation.value);
        }
        summary.holdings.push(valuation);
    }

    summary.total_value = round2(total_value);
    summary.total_cost = round2(total_cost);
    summary.total_profit_loss = round2(total_value - total_cost);
    summary
}

/// Price `holdings` with one batch request and value them.
///
/// No request is made for an empty slice. Unavailable quotes count as zero.
pub fn value_at_market(quotes: &QuoteClient, holdings: &[Holding]) -> PortfolioSummary {
    if holdings.is_empty() {
        return PortfolioSummary::default();
    }
    let coins: Vec<&str> = holdings.iter().map(|h| h.coin.as_str()).collect();
    let prices = quotes.get_prices_batch(&coins);
    value_portfolio(holdings, &prices)
}
