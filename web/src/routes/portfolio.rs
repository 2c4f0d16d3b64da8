use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use axum::{Extension, Form};
use coinfolio::NewHolding;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::session::Session;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct AddCoinForm {
    pub coin: String,
    pub amount: f64,
    pub buy_price: f64,
}

/// POST /add_coin  (form: coin, amount, buy_price)
///
/// Records a holding for the logged-in account. The coin string is stored
/// as typed.
pub async fn add_coin(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Form(form): Form<AddCoinForm>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let holding = state
        .app
        .add_holding(
            session.account_id,
            NewHolding {
                coin: form.coin,
                amount: form.amount,
                buy_price: form.buy_price,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Coin added successfully!",
            "data": holding,
        })),
    ))
}

/// GET /dashboard
///
/// Values every holding at current prices. Always succeeds when the store
/// is reachable: missing prices show up as zero value.
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Result<Json<Value>, AppError> {
    let summary = state.app.dashboard(session.account_id).await?;

    Ok(Json(json!({
        "username": session.username,
        "portfolio": summary.holdings,
        "total_value": summary.total_value,
        "total_cost": summary.total_cost,
        "total_profit_loss": summary.total_profit_loss,
        "chart_labels": summary.chart_labels,
        "chart_values": summary.chart_values,
    })))
}
