//! Cookie sessions held in process memory.
//!
//! A session is created on login and identifies the acting account for the
//! protected routes. Sessions do not survive a restart.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Request, State};
use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use coinfolio::config::SESSION_COOKIE;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

/// The logged-in account, inserted into request extensions for protected routes.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub account_id: i64,
    pub username: String,
}

#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Session>>,
}

impl SessionStore {
    /// Store `session` under a fresh random token and return the token.
    pub fn create(&self, session: Session) -> Result<String, AppError> {
        let token = Uuid::new_v4().to_string();
        self.sessions
            .lock()
            .map_err(|_| AppError::internal("Session lock poisoned"))?
            .insert(token.clone(), session);
        Ok(token)
    }

    pub fn get(&self, token: &str) -> Result<Option<Session>, AppError> {
        let sessions = self
            .sessions
            .lock()
            .map_err(|_| AppError::internal("Session lock poisoned"))?;
        Ok(sessions.get(token).cloned())
    }

    pub fn remove(&self, token: &str) -> Result<Option<Session>, AppError> {
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|_| AppError::internal("Session lock poisoned"))?;
        Ok(sessions.remove(token))
    }

    /// Look up the session named by the request's cookie, if any.
    pub fn from_headers(&self, headers: &HeaderMap) -> Result<Option<Session>, AppError> {
        match session_token(headers) {
            Some(token) => self.get(&token),
            None => Ok(None),
        }
    }
}

/// Extract the session token from the `Cookie` header(s).
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token.to_string())
        .filter(|token| !token.is_empty())
}

pub fn session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax")
}

pub fn expired_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Middleware for routes that need a logged-in account.
///
/// Without a valid session the client is redirected to `/login`.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    match state.sessions.from_headers(req.headers()) {
        Ok(Some(session)) => {
            req.extensions_mut().insert(session);
            next.run(req).await
        }
        Ok(None) => Redirect::to("/login").into_response(),
        Err(e) => e.into_response(),
    }
}
