//! # Insight Server
//!
//! HTTP front end for [`insight_core`]: a welcome and health endpoint plus
//! `POST /v2/image_insight/extract`.

pub mod config;
pub mod error;
pub mod logging;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod state;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

pub use config::ServerConfig;
pub use error::ApiError;
pub use response::{ErrorBody, InsightResponse};
pub use routes::router;
pub use state::AppState;

/// Loads the processor, binds and serves until Ctrl-C.
pub async fn serve(config: ServerConfig) -> Result<()> {
    let state = AppState::from_config(&config)?;
    let app = router(state);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, app = %config.app_name, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
