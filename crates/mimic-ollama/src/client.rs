// SPDX-FileCopyrightText: 2026 Mimic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for Ollama's generate API.
//!
//! Transport failures and non-success statuses surface as
//! [`MimicError::ModelUnavailable`]. A passed deadline surfaces as
//! [`MimicError::GenerationTimeout`]. A body we cannot read surfaces as
//! [`MimicError::Provider`].

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use tracing::{debug, warn};

use mimic_config::model::OllamaConfig;
use mimic_core::traits::adapter::PluginAdapter;
use mimic_core::traits::{GenerationAdapter, TextStream};
use mimic_core::types::{GenerationOptions, HealthStatus};
use mimic_core::MimicError;

use crate::stream::ndjson_text_stream;
use crate::types::{
    same_model, ErrorBody, GenerateRequest, GenerateResponse, RequestOptions, TagsResponse,
};

/// Connection attempts give up after this long, regardless of the generation deadline.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Health checks use a short deadline of their own.
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Sampling options taken from the `[ollama]` config section.
pub fn generation_options(config: &OllamaConfig) -> GenerationOptions {
    GenerationOptions {
        temperature: config.temperature,
        max_tokens: config.max_tokens,
        stop_sequences: config.stop_sequences.clone(),
    }
}

/// Client for one model on one Ollama server.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    timeout: Duration,
    retry_on_timeout: bool,
}

impl OllamaClient {
    pub fn new(config: &OllamaConfig) -> Result<Self, MimicError> {
        Self::from_parts(
            &config.base_url,
            &config.model,
            Duration::from_secs(config.timeout_secs),
            config.retry_on_timeout,
        )
    }

    pub fn from_parts(
        base_url: &str,
        model: &str,
        timeout: Duration,
        retry_on_timeout: bool,
    ) -> Result<Self, MimicError> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .timeout(timeout)
            .build()
            .map_err(|e| MimicError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            timeout,
            retry_on_timeout,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn transport_err(&self, e: reqwest::Error) -> MimicError {
        if e.is_timeout() {
            MimicError::GenerationTimeout {
                duration: self.timeout,
            }
        } else {
            MimicError::ModelUnavailable {
                message: format!("cannot reach ollama at {}: {e}", self.base_url),
                source: Some(Box::new(e)),
            }
        }
    }

    fn body_err(&self, e: reqwest::Error) -> MimicError {
        if e.is_timeout() {
            MimicError::GenerationTimeout {
                duration: self.timeout,
            }
        } else {
            MimicError::Provider {
                message: format!("failed to read response body: {e}"),
                source: Some(Box::new(e)),
            }
        }
    }

    /// Number of attempts allowed for one generation.
    fn attempts(&self) -> u32 {
        if self.retry_on_timeout { 2 } else { 1 }
    }

    /// Sends the generate request and checks the status.
    async fn send(
        &self,
        prompt: &str,
        options: &GenerationOptions,
        stream: bool,
    ) -> Result<reqwest::Response, MimicError> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream,
            options: RequestOptions {
                temperature: options.temperature,
                num_predict: options.max_tokens,
                stop: &options.stop_sequences,
            },
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_err(e))?;

        let status = response.status();
        debug!(status = %status, stream, "generate response received");
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error)
            .unwrap_or(body);
        Err(MimicError::ModelUnavailable {
            message: format!("ollama returned {status} for model '{}': {detail}", self.model),
            source: None,
        })
    }

    async fn generate_once(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, MimicError> {
        let response = self.send(prompt, options, false).await?;
        let body = response.bytes().await.map_err(|e| self.body_err(e))?;
        let parsed: GenerateResponse =
            serde_json::from_slice(&body).map_err(|e| MimicError::Provider {
                message: format!("failed to parse generate response: {e}"),
                source: Some(Box::new(e)),
            })?;
        if let Some(error) = parsed.error {
            return Err(MimicError::Provider {
                message: format!("ollama error: {error}"),
                source: None,
            });
        }
        Ok(parsed.response.trim().to_string())
    }

    /// Generates a complete reply, retrying once on timeout when configured.
    pub async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, MimicError> {
        let attempts = self.attempts();
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.generate_once(prompt, options).await {
                Err(MimicError::GenerationTimeout { duration }) if attempt < attempts => {
                    warn!(?duration, attempt, "generation timed out, retrying");
                }
                other => return other,
            }
        }
    }

    /// Streams a reply. The retry covers only the request, not a stream
    /// that has already started.
    pub async fn generate_stream(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<TextStream, MimicError> {
        let attempts = self.attempts();
        let mut attempt = 0;
        let response = loop {
            attempt += 1;
            match self.send(prompt, options, true).await {
                Err(MimicError::GenerationTimeout { duration }) if attempt < attempts => {
                    warn!(?duration, attempt, "stream request timed out, retrying");
                }
                other => break other?,
            }
        };

        let this = self.clone();
        let bytes = response
            .bytes_stream()
            .map(move |chunk| chunk.map_err(|e| this.body_err(e)));
        Ok(ndjson_text_stream(bytes))
    }

    /// Names of the models the server has pulled.
    pub async fn list_models(&self) -> Result<Vec<String>, MimicError> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await
            .map_err(|e| MimicError::ModelUnavailable {
                message: format!("cannot reach ollama at {}: {e}", self.base_url),
                source: Some(Box::new(e)),
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(MimicError::ModelUnavailable {
                message: format!("ollama returned {status} listing models"),
                source: None,
            });
        }
        let tags: TagsResponse = response.json().await.map_err(|e| MimicError::Provider {
            message: format!("failed to parse model list: {e}"),
            source: Some(Box::new(e)),
        })?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }
}

#[async_trait]
impl PluginAdapter for OllamaClient {
    async fn health_check(&self) -> Result<HealthStatus, MimicError> {
        match self.list_models().await {
            Ok(models) if models.iter().any(|m| same_model(m, &self.model)) => {
                Ok(HealthStatus::Healthy)
            }
            Ok(_) => Ok(HealthStatus::Degraded(format!(
                "model '{}' is not pulled; run `ollama pull {}`",
                self.model, self.model
            ))),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }
}

#[async_trait]
impl GenerationAdapter for OllamaClient {
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, MimicError> {
        OllamaClient::generate(self, prompt, options).await
    }

    async fn generate_stream(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<TextStream, MimicError> {
        OllamaClient::generate_stream(self, prompt, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(base_url: &str) -> OllamaClient {
        OllamaClient::from_parts(base_url, "llama3:8b", Duration::from_secs(5), false).unwrap()
    }

    fn options() -> GenerationOptions {
        GenerationOptions {
            temperature: 0.7,
            max_tokens: 32,
            stop_sequences: vec!["\nYou:".into()],
        }
    }

    #[tokio::test]
    async fn generate_success_trims_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(serde_json::json!({
                "model": "llama3:8b",
                "stream": false,
                "options": { "num_predict": 32, "stop": ["\nYou:"] }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "llama3:8b",
                "response": "  theek hun yr 😄\n",
                "done": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = client(&server.uri()).generate("prompt", &options()).await.unwrap();
        assert_eq!(reply, "theek hun yr 😄");
    }

    #[tokio::test]
    async fn missing_model_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error": "model 'llama3:8b' not found, try pulling it first"
            })))
            .mount(&server)
            .await;

        let err = client(&server.uri()).generate("p", &options()).await.unwrap_err();
        match err {
            MimicError::ModelUnavailable { message, .. } => {
                assert!(message.contains("404"));
                assert!(message.contains("try pulling it first"));
            }
            other => panic!("unexpected: {other}"),
        }
    }

    #[tokio::test]
    async fn unreachable_server_fails_fast() {
        let start = Instant::now();
        let err = client("http://127.0.0.1:1")
            .generate("p", &options())
            .await
            .unwrap_err();
        assert!(matches!(err, MimicError::ModelUnavailable { .. }));
        assert!(start.elapsed() < Duration::from_secs(6));
    }

    #[tokio::test]
    async fn slow_server_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "response": "late", "done": true }))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let client =
            OllamaClient::from_parts(&server.uri(), "llama3:8b", Duration::from_millis(300), false)
                .unwrap();
        let err = client.generate("p", &options()).await.unwrap_err();
        assert!(matches!(err, MimicError::GenerationTimeout { .. }));
    }

    #[tokio::test]
    async fn timeout_retried_once_when_enabled() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "response": "late", "done": true }))
                    .set_delay(Duration::from_secs(3)),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "response": "on time", "done": true })),
            )
            .mount(&server)
            .await;

        let client =
            OllamaClient::from_parts(&server.uri(), "llama3:8b", Duration::from_millis(300), true)
                .unwrap();
        assert_eq!(client.generate("p", &options()).await.unwrap(), "on time");
    }

    #[tokio::test]
    async fn malformed_body_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
            .mount(&server)
            .await;

        let err = client(&server.uri()).generate("p", &options()).await.unwrap_err();
        assert!(matches!(err, MimicError::Provider { .. }));
    }

    #[tokio::test]
    async fn stream_yields_ndjson_fragments() {
        let server = MockServer::start().await;
        let body = concat!(
            "{\"response\":\"bas \",\"done\":false}\n",
            "{\"response\":\"yr\",\"done\":false}\n",
            "{\"response\":\"\",\"done\":true}\n",
        );
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(serde_json::json!({ "stream": true })))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(body, "application/x-ndjson"),
            )
            .mount(&server)
            .await;

        let mut stream = client(&server.uri())
            .generate_stream("p", &options())
            .await
            .unwrap();
        let mut text = String::new();
        while let Some(chunk) = stream.next().await {
            text.push_str(&chunk.unwrap());
        }
        assert_eq!(text, "bas yr");
    }

    #[tokio::test]
    async fn health_check_reports_missing_model() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "models": [{ "name": "mistral:latest" }]
            })))
            .mount(&server)
            .await;

        let status = client(&server.uri()).health_check().await.unwrap();
        assert!(matches!(status, HealthStatus::Degraded(ref m) if m.contains("ollama pull")));
    }

    #[tokio::test]
    async fn health_check_unreachable_is_unhealthy() {
        let status = client("http://127.0.0.1:1").health_check().await.unwrap();
        assert!(matches!(status, HealthStatus::Unhealthy(_)));
    }

    #[test]
    fn options_follow_config() {
        let config = OllamaConfig {
            temperature: 0.2,
            max_tokens: 99,
            ..OllamaConfig::default()
        };
        let opts = generation_options(&config);
        assert_eq!(opts.temperature, 0.2);
        assert_eq!(opts.max_tokens, 99);
    }
}
