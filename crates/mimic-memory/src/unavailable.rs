// SPDX-FileCopyrightText: 2026 Mimic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stand-in embedder for when the configured backend could not start.

use async_trait::async_trait;

use mimic_core::traits::adapter::PluginAdapter;
use mimic_core::traits::EmbeddingAdapter;
use mimic_core::types::{EmbeddingInput, EmbeddingOutput, HealthStatus};
use mimic_core::MimicError;

/// Fails every embedding request with the reason the real backend is missing.
#[derive(Debug, Clone)]
pub struct UnavailableEmbedder {
    reason: String,
}

impl UnavailableEmbedder {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl PluginAdapter for UnavailableEmbedder {
    async fn health_check(&self) -> Result<HealthStatus, MimicError> {
        Ok(HealthStatus::Unhealthy(self.reason.clone()))
    }
}

#[async_trait]
impl EmbeddingAdapter for UnavailableEmbedder {
    async fn embed(&self, _input: EmbeddingInput) -> Result<EmbeddingOutput, MimicError> {
        Err(MimicError::Embedding(format!(
            "embedding backend unavailable: {}",
            self.reason
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_the_reason() {
        let embedder = UnavailableEmbedder::new("model download failed");
        assert_eq!(
            embedder.health_check().await.unwrap(),
            HealthStatus::Unhealthy("model download failed".into())
        );
        let err = embedder
            .embed(EmbeddingInput::single("kya haal hai"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("model download failed"));
    }
}
