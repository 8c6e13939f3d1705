// SPDX-FileCopyrightText: 2026 Mimic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers.
//!
//! Handles GET /, POST /v1/chat and GET /health.

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use mimic_agent::{ReplyKind, TurnReply};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::server::GatewayState;

/// Longest accepted message, in characters.
pub const MAX_MESSAGE_CHARS: usize = 4000;

/// Request body for POST /v1/chat.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Continue an existing conversation. A new one is started when absent.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Response body for POST /v1/chat.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub session_id: String,
    pub kind: ReplyKind,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub examples: usize,
    pub phrases: usize,
    pub sessions: usize,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn bad_request(error: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
        .into_response()
}

/// GET /
pub async fn get_index(State(state): State<GatewayState>) -> Html<String> {
    Html(state.page.to_string())
}

/// POST /v1/chat
///
/// Runs one turn against the caller's session. A turn that exceeds the
/// configured timeout answers with the fallback reply.
pub async fn post_chat(
    State(state): State<GatewayState>,
    Json(body): Json<ChatRequest>,
) -> Response {
    let message = body.message.trim();
    if message.is_empty() {
        return bad_request("message must not be empty");
    }
    let chars = message.chars().count();
    if chars > MAX_MESSAGE_CHARS {
        return bad_request(format!(
            "message is {chars} characters, the limit is {MAX_MESSAGE_CHARS}"
        ));
    }

    let (session_id, session) = state.sessions.get_or_create(body.session_id.as_deref());
    let pipeline = state.pipeline.clone();

    let turn = async {
        let mut session = session.lock().await;
        pipeline.process_turn(&mut session, message).await
    };

    let reply = match tokio::time::timeout(state.turn_timeout, turn).await {
        Ok(reply) => reply,
        Err(_) => {
            warn!(session_id = %session_id, timeout = ?state.turn_timeout, "turn timed out");
            TurnReply {
                text: state.pipeline.fallback_reply().to_string(),
                kind: ReplyKind::Fallback,
            }
        }
    };
    debug!(session_id = %session_id, kind = %reply.kind, "turn complete");

    (
        StatusCode::OK,
        Json(ChatResponse {
            reply: reply.text,
            session_id,
            kind: reply.kind,
        }),
    )
        .into_response()
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    let store = state.pipeline.store();
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        examples: store.example_count(),
        phrases: store.phrase_count(),
        sessions: state.sessions.len(),
    })
}
