// SPDX-FileCopyrightText: 2026 Mimic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock generation adapter for deterministic testing.
//!
//! `MockGenerator` pops scripted replies from a FIFO queue. When the queue
//! is empty, a default "mock response" text is returned. Every prompt it
//! receives is recorded so tests can inspect what the assembler produced.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream;
use tokio::sync::Mutex;

use mimic_core::traits::adapter::PluginAdapter;
use mimic_core::traits::{GenerationAdapter, TextStream};
use mimic_core::types::{GenerationOptions, HealthStatus};
use mimic_core::MimicError;

/// One scripted outcome.
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    /// Fails as if the model server were down.
    Unavailable,
    /// Fails as if the deadline passed.
    Timeout,
    /// Fails as if the server answered with garbage.
    Malformed,
}

impl MockReply {
    fn into_result(self) -> Result<String, MimicError> {
        match self {
            MockReply::Text(text) => Ok(text),
            MockReply::Unavailable => Err(MimicError::ModelUnavailable {
                message: "mock server unreachable".to_string(),
                source: None,
            }),
            MockReply::Timeout => Err(MimicError::GenerationTimeout {
                duration: Duration::from_secs(1),
            }),
            MockReply::Malformed => Err(MimicError::Provider {
                message: "mock malformed body".to_string(),
                source: None,
            }),
        }
    }
}

/// A generation adapter that returns pre-configured replies.
pub struct MockGenerator {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::with_replies(Vec::new())
    }

    /// Create a generator pre-loaded with text replies.
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self::with_replies(responses.into_iter().map(MockReply::Text).collect())
    }

    pub fn with_replies(replies: Vec<MockReply>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::from(replies))),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a reply to the end of the queue.
    pub async fn push(&self, reply: MockReply) {
        self.replies.lock().await.push_back(reply);
    }

    /// Prompts received so far, oldest first.
    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }

    async fn next_reply(&self, prompt: &str) -> Result<String, MimicError> {
        self.prompts.lock().await.push(prompt.to_string());
        self.replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| MockReply::Text("mock response".to_string()))
            .into_result()
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockGenerator {
    async fn health_check(&self) -> Result<HealthStatus, MimicError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl GenerationAdapter for MockGenerator {
    async fn generate(
        &self,
        prompt: &str,
        _options: &GenerationOptions,
    ) -> Result<String, MimicError> {
        self.next_reply(prompt).await
    }

    async fn generate_stream(
        &self,
        prompt: &str,
        _options: &GenerationOptions,
    ) -> Result<TextStream, MimicError> {
        let text = self.next_reply(prompt).await?;
        // Word-sized chunks that concatenate back to the full text.
        let mut chunks = Vec::new();
        let mut current = String::new();
        for ch in text.chars() {
            current.push(ch);
            if ch == ' ' {
                chunks.push(Ok(std::mem::take(&mut current)));
            }
        }
        if !current.is_empty() {
            chunks.push(Ok(current));
        }
        Ok(Box::pin(stream::iter(chunks)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn default_response_when_queue_empty() {
        let g = MockGenerator::new();
        let reply = g.generate("hi", &GenerationOptions::default()).await.unwrap();
        assert_eq!(reply, "mock response");
        assert_eq!(g.prompts().await, vec!["hi".to_string()]);
    }

    #[tokio::test]
    async fn scripted_failures_map_to_errors() {
        let g = MockGenerator::with_replies(vec![MockReply::Unavailable, MockReply::Timeout]);
        let opts = GenerationOptions::default();
        assert!(matches!(
            g.generate("a", &opts).await,
            Err(MimicError::ModelUnavailable { .. })
        ));
        assert!(matches!(
            g.generate("b", &opts).await,
            Err(MimicError::GenerationTimeout { .. })
        ));
    }

    #[tokio::test]
    async fn stream_chunks_concatenate_to_reply() {
        let g = MockGenerator::with_responses(vec!["bas yr theek".to_string()]);
        let mut stream = g
            .generate_stream("p", &GenerationOptions::default())
            .await
            .unwrap();
        let mut out = String::new();
        let mut count = 0;
        while let Some(chunk) = stream.next().await {
            out.push_str(&chunk.unwrap());
            count += 1;
        }
        assert_eq!(out, "bas yr theek");
        assert_eq!(count, 3);
    }
}
