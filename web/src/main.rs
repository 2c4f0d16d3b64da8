mod error;
mod routes;
mod session;
mod state;

use std::sync::Arc;

use anyhow::Context;
use coinfolio::async_client::AsyncCoinfolioBuilder;
use coinfolio::Settings;
use tracing_subscriber::EnvFilter;

use session::SessionStore;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,coinfolio=debug,coinfolio_web=debug")),
        )
        .init();

    let settings = Settings::from_env().context("reading configuration")?;
    tracing::info!(database = %settings.database_path.display(), price_api = %settings.price_api_base, "starting");
    tracing::warn!(
        "passwords are stored and compared in plaintext; do not expose this service to real users"
    );

    let app = AsyncCoinfolioBuilder::from_settings(&settings)
        .build()
        .await
        .context("opening portfolio store")?;

    let state = Arc::new(AppState {
        app,
        sessions: SessionStore::default(),
    });

    let addr = format!("0.0.0.0:{}", settings.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!("Listening on http://{addr}");
    axum::serve(listener, routes::router(state)).await?;
    Ok(())
}
