use crate::session::SessionStore;

/// Shared application state available to all route handlers via Axum's
/// `State` extractor.
pub struct AppState {
    /// Store and price client. Dispatches blocking work to Tokio's
    /// blocking pool internally.
    pub app: coinfolio::AsyncCoinfolio,

    /// Logged-in sessions, keyed by cookie token.
    pub sessions: SessionStore,
}
