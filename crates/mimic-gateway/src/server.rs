// SPDX-FileCopyrightText: 2026 Mimic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Web server built on axum.
//!
//! Sets up routes, middleware, and shared state for the chat widget.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    routing::{get, post},
    Router,
};
use mimic_agent::{ReplyPipeline, SessionRegistry};
use mimic_core::MimicError;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::widget::WidgetPage;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub pipeline: Arc<ReplyPipeline>,
    pub sessions: Arc<SessionRegistry>,
    /// Pre-rendered widget HTML.
    pub page: Arc<str>,
    /// Upper bound on one turn, lock wait included.
    pub turn_timeout: Duration,
    pub start_time: Instant,
}

impl GatewayState {
    pub fn new(
        pipeline: Arc<ReplyPipeline>,
        sessions: Arc<SessionRegistry>,
        page: &WidgetPage,
        turn_timeout: Duration,
    ) -> Self {
        Self {
            pipeline,
            sessions,
            page: Arc::from(page.render()),
            turn_timeout,
            start_time: Instant::now(),
        }
    }
}

/// Bind address for the web server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Routes:
/// - GET / (chat widget)
/// - POST /v1/chat
/// - GET /health
pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route("/", get(handlers::get_index))
        .route("/v1/chat", post(handlers::post_chat))
        .route("/health", get(handlers::get_health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Serves until `shutdown` is cancelled.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    shutdown: CancellationToken,
) -> Result<(), MimicError> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| MimicError::Config(format!("failed to bind web server to {addr}: {e}")))?;

    tracing::info!("web server listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| MimicError::Internal(format!("web server error: {e}")))?;

    tracing::info!("web server stopped");
    Ok(())
}
