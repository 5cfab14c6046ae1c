//! Web UI: a single form page plus a small JSON API

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod handlers;
pub mod page;
pub mod theme;

use crate::config::{Config, UiConfig};
use crate::pipeline::Pipeline;

/// Shared, read-only state for request handlers
pub struct AppState {
    pub pipeline: Pipeline,
    pub ui: UiConfig,
}

impl AppState {
    pub fn new(pipeline: Pipeline, ui: UiConfig) -> Self {
        Self { pipeline, ui }
    }

    pub async fn from_config(config: &Config) -> Result<Self> {
        let pipeline = Pipeline::from_config(config).await?;
        Ok(Self::new(pipeline, config.ui.clone()))
    }
}

/// Create the Axum router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/process", post(handlers::process_form))
        .route("/api/process", post(handlers::process_json))
        .route("/api/languages", get(handlers::languages))
        .route("/health", get(handlers::health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve the UI until the process is stopped
pub async fn serve(config: &Config, addr: SocketAddr) -> Result<()> {
    let state = Arc::new(AppState::from_config(config).await?);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Web UI listening on http://{}", addr);

    axum::serve(listener, app).await.context("HTTP server error")?;
    Ok(())
}
