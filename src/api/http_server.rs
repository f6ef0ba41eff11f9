// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::detect::detect_handler;
use super::handlers::{health_handler, index_handler};
use crate::vision::ObjectDetector;

/// Maximum accepted request body (16 MiB)
pub const MAX_BODY_SIZE: usize = 16 * 1024 * 1024;

/// Shared state injected into every handler
#[derive(Clone)]
pub struct AppState {
    /// Loaded once at startup, never replaced
    pub detector: Arc<dyn ObjectDetector>,
    /// Reported by `GET /health`
    pub model_name: Arc<str>,
}

impl AppState {
    pub fn new(detector: Arc<dyn ObjectDetector>, model_name: &str) -> Self {
        Self {
            detector,
            model_name: Arc::from(model_name),
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/detect", post(detect_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until Ctrl-C
pub async fn start_server(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("API server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
