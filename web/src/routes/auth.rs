use std::sync::Arc;

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Redirect, Response};
use axum::Form;
use serde::Deserialize;
use serde_json::json;

use crate::error::AppError;
use crate::session::{self, Session};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// GET /
///
/// Send logged-in users to their dashboard and everyone else to login.
pub async fn home(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Redirect, AppError> {
    match state.sessions.from_headers(&headers)? {
        Some(_) => Ok(Redirect::to("/dashboard")),
        None => Ok(Redirect::to("/login")),
    }
}

/// POST /signup  (form: username, password)
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Form(form): Form<Credentials>,
) -> Result<Response, AppError> {
    let account = state
        .app
        .register(&form.username, &form.password)
        .await
        .map_err(|e| match e {
            coinfolio::CoinfolioError::Conflict(_) => AppError::conflict("Username already exists!"),
            other => other.into(),
        })?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Account created successfully! Please login.",
            "data": account,
        })),
    )
        .into_response())
}

/// POST /login  (form: username, password)
///
/// Starts a session and returns it as the `coinfolio_session` cookie.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Form(form): Form<Credentials>,
) -> Result<Response, AppError> {
    let account = state
        .app
        .login(&form.username, &form.password)
        .await
        .map_err(|e| match e {
            coinfolio::CoinfolioError::Unauthorized(_) => {
                AppError::unauthorized("Invalid username or password!")
            }
            other => other.into(),
        })?;

    let token = state.sessions.create(Session {
        account_id: account.id,
        username: account.username.clone(),
    })?;
    tracing::info!(account_id = account.id, "session started");

    Ok((
        [(SET_COOKIE, session::session_cookie(&token))],
        Json(json!({
            "message": "Login successful!",
            "username": account.username,
        })),
    )
        .into_response())
}

/// GET /logout
///
/// Ends the current session (if any) and redirects to login.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    if let Some(token) = session::session_token(&headers) {
        if let Some(ended) = state.sessions.remove(&token)? {
            tracing::info!(account_id = ended.account_id, "session ended");
        }
    }
    Ok((
        [(SET_COOKIE, session::expired_cookie())],
        Redirect::to("/login"),
    )
        .into_response())
}
