//! Axum server for the listings API

use anyhow::{Context, Result};
use axum::{routing::get, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::handlers::{self, AppState};
use crate::config::ApiConfig;

/// Routes served by the listings API
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/cheapest_listings", get(handlers::cheapest_listings))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until Ctrl-C
pub async fn run(config: ApiConfig) -> Result<()> {
    let addr = config.listen_addr;
    let state = AppState {
        config: Arc::new(config),
    };
    let app = create_router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .context("Failed to bind HTTP server")?;

    info!("Listings API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("HTTP server shutting down");
        })
        .await
        .context("HTTP server error")?;

    Ok(())
}
