// SPDX-FileCopyrightText: 2026 Mimic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding adapter backed by a local Ollama server.
//!
//! Uses `POST /api/embed {model, input: [..]}`, which returns one vector per
//! input in a single round trip.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use mimic_core::traits::adapter::PluginAdapter;
use mimic_core::traits::EmbeddingAdapter;
use mimic_core::types::{EmbeddingInput, EmbeddingOutput, HealthStatus};
use mimic_core::MimicError;
use mimic_ollama::TagsResponse;

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Embedding adapter that delegates to Ollama.
pub struct OllamaEmbedder {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaEmbedder {
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self, MimicError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MimicError::Internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl PluginAdapter for OllamaEmbedder {
    async fn health_check(&self) -> Result<HealthStatus, MimicError> {
        let url = format!("{}/api/tags", self.base_url);
        let resp = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => return Ok(HealthStatus::Unhealthy(format!("unreachable: {e}"))),
        };
        let tags: TagsResponse = match resp.json().await {
            Ok(t) => t,
            Err(e) => return Ok(HealthStatus::Degraded(format!("unreadable tag list: {e}"))),
        };
        if tags.contains(&self.model) {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Degraded(format!(
                "model '{}' is not pulled",
                self.model
            )))
        }
    }
}

#[async_trait]
impl EmbeddingAdapter for OllamaEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, MimicError> {
        if input.texts.is_empty() {
            return Ok(EmbeddingOutput {
                embeddings: Vec::new(),
                dimensions: 0,
            });
        }

        let url = format!("{}/api/embed", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(&EmbedRequest {
                model: &self.model,
                input: &input.texts,
            })
            .send()
            .await
            .map_err(|e| MimicError::Embedding(format!("ollama not reachable at {url}: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(MimicError::Embedding(format!(
                "ollama embed returned {status}: {body}"
            )));
        }

        let body: EmbedResponse = resp
            .json()
            .await
            .map_err(|e| MimicError::Embedding(format!("malformed embed response: {e}")))?;

        if body.embeddings.len() != input.texts.len() {
            return Err(MimicError::Embedding(format!(
                "expected {} embeddings, got {}",
                input.texts.len(),
                body.embeddings.len()
            )));
        }
        let dimensions = body.embeddings.first().map(Vec::len).unwrap_or(0);
        debug!(count = body.embeddings.len(), dimensions, "ollama embeddings");

        Ok(EmbeddingOutput {
            embeddings: body.embeddings,
            dimensions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn embedder(server: &MockServer) -> OllamaEmbedder {
        OllamaEmbedder::new(&server.uri(), "nomic-embed-text", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn embeds_a_batch_in_one_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .and(body_partial_json(serde_json::json!({
                "model": "nomic-embed-text",
                "input": ["a", "b"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "embeddings": [[0.1, 0.2, 0.3], [0.4, 0.5, 0.6]]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let out = embedder(&server)
            .embed(EmbeddingInput {
                texts: vec!["a".into(), "b".into()],
            })
            .await
            .unwrap();
        assert_eq!(out.embeddings.len(), 2);
        assert_eq!(out.dimensions, 3);
    }

    #[tokio::test]
    async fn count_mismatch_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "embeddings": [[0.1]] })),
            )
            .mount(&server)
            .await;

        let err = embedder(&server)
            .embed(EmbeddingInput {
                texts: vec!["a".into(), "b".into()],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, MimicError::Embedding(_)));
    }

    #[tokio::test]
    async fn missing_model_reports_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .respond_with(
                ResponseTemplate::new(404).set_body_string("model \"nomic-embed-text\" not found"),
            )
            .mount(&server)
            .await;

        let err = embedder(&server)
            .embed(EmbeddingInput::single("a"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn health_check_looks_for_model_tag() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "models": [{ "name": "nomic-embed-text:latest" }]
            })))
            .mount(&server)
            .await;

        assert_eq!(
            embedder(&server).health_check().await.unwrap(),
            HealthStatus::Healthy
        );
    }
}
