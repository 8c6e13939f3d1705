// SPDX-FileCopyrightText: 2026 Mimic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Router-level tests driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use mimic_agent::{PipelineSettings, ReplyPipeline, SessionRegistry};
use mimic_config::model::WebConfig;
use mimic_context::{Persona, PromptAssembler};
use mimic_core::types::GenerationOptions;
use mimic_gateway::{build_router, GatewayState, WidgetPage};
use mimic_memory::ExampleStore;
use mimic_storage::Database;
use mimic_test_utils::{MockEmbedder, MockGenerator, MockReply};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn state_with(generator: MockGenerator, turn_timeout: Duration) -> GatewayState {
    let db = Database::open_in_memory().await.unwrap();
    let mut store = ExampleStore::open(&db, Arc::new(MockEmbedder::new()), "mock")
        .await
        .unwrap();
    store
        .add_examples(vec![("Kya hal ha?".into(), "bas yr theek, tum batao".into())])
        .await
        .unwrap();

    let pipeline = ReplyPipeline::new(
        Arc::new(store),
        Arc::new(generator),
        PromptAssembler::new(8000),
        Persona::with_default_description("Saman"),
        GenerationOptions::default(),
        PipelineSettings {
            examples_per_prompt: 5,
            phrases_per_prompt: 10,
            direct_match: true,
            direct_match_overlap: 0.5,
            fallback_reply: "sorry yr".into(),
        },
    );
    GatewayState::new(
        Arc::new(pipeline),
        Arc::new(SessionRegistry::new(5, 16)),
        &WidgetPage::from_config(&WebConfig::default(), "Saman"),
        turn_timeout,
    )
}

async fn post_chat(state: &GatewayState, body: Value) -> (StatusCode, Value) {
    let response = build_router(state.clone())
        .oneshot(
            Request::post("/v1/chat")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn index_serves_widget() {
    let state = state_with(MockGenerator::new(), Duration::from_secs(5)).await;
    let response = build_router(state)
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("Chat with Saman"));
    assert!(html.contains("/v1/chat"));
}

#[tokio::test]
async fn chat_returns_reply_and_reuses_session() {
    let generator = MockGenerator::with_responses(vec!["first".into(), "second".into()]);
    let state = state_with(generator, Duration::from_secs(5)).await;

    let (status, body) = post_chat(&state, json!({"message": "khana kha liya?"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], "first");
    assert_eq!(body["kind"], "generated");
    let session_id = body["session_id"].as_str().unwrap().to_string();

    let (_, body) = post_chat(
        &state,
        json!({"message": "aur sunao", "session_id": session_id}),
    )
    .await;
    assert_eq!(body["session_id"], session_id.as_str());
    assert_eq!(state.sessions.len(), 1);

    let (_, session) = state.sessions.get_or_create(Some(&session_id));
    assert_eq!(session.lock().await.len(), 2);
}

#[tokio::test]
async fn direct_match_is_reported() {
    let state = state_with(MockGenerator::new(), Duration::from_secs(5)).await;
    let (_, body) = post_chat(&state, json!({"message": "kya hal ha?"})).await;
    assert_eq!(body["kind"], "direct_match");
    assert_eq!(body["reply"], "bas yr theek, tum batao");
}

#[tokio::test]
async fn model_failure_yields_fallback() {
    let generator = MockGenerator::with_replies(vec![MockReply::Unavailable]);
    let state = state_with(generator, Duration::from_secs(5)).await;
    let (status, body) = post_chat(&state, json!({"message": "hello"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["kind"], "fallback");
    assert_eq!(body["reply"], "sorry yr");
}

#[tokio::test]
async fn turn_timeout_yields_fallback() {
    let state = state_with(MockGenerator::new(), Duration::from_millis(50)).await;
    let (_, session) = state.sessions.get_or_create(Some("busy"));
    let _held = session.lock().await;

    let (status, body) = post_chat(&state, json!({"message": "hello", "session_id": "busy"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["kind"], "fallback");
}

#[tokio::test]
async fn invalid_messages_are_rejected() {
    let state = state_with(MockGenerator::new(), Duration::from_secs(5)).await;

    let (status, body) = post_chat(&state, json!({"message": "   "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("empty"));

    let long = "a".repeat(4001);
    let (status, _) = post_chat(&state, json!({"message": long})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(state.sessions.is_empty());
}

#[tokio::test]
async fn health_reports_store_counts() {
    let state = state_with(MockGenerator::new(), Duration::from_secs(5)).await;
    let response = build_router(state)
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["examples"], 1);
    assert_eq!(body["phrases"], 0);
}
