// SPDX-FileCopyrightText: 2026 Mimic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types passed between the store, the assembler and the front ends.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is reachable but not fully usable.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// A stored message/response pair written by the persona.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
    /// SQLite rowid; also the insertion order.
    pub id: i64,
    /// The message the persona was replying to.
    pub source_message: String,
    /// What the persona wrote back.
    pub response: String,
    #[serde(skip)]
    pub embedding: Vec<f32>,
}

/// A short fragment the persona uses often.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phrase {
    pub id: i64,
    pub text: String,
    /// Occurrences across the ingested corpus.
    pub frequency: u32,
    #[serde(skip)]
    pub embedding: Vec<f32>,
}

/// A query hit together with its cosine similarity.
#[derive(Debug, Clone, PartialEq)]
pub struct Scored<T> {
    pub item: T,
    pub score: f32,
}

/// One message/reply exchange within a conversation session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub message: String,
    pub reply: String,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    /// Creates a turn stamped with the current time.
    pub fn now(message: impl Into<String>, reply: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            reply: reply.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Input for an embedding adapter.
#[derive(Debug, Clone)]
pub struct EmbeddingInput {
    pub texts: Vec<String>,
}

impl EmbeddingInput {
    /// Convenience constructor for a single text.
    pub fn single(text: impl Into<String>) -> Self {
        Self {
            texts: vec![text.into()],
        }
    }
}

/// Output from an embedding adapter, one vector per input text.
#[derive(Debug, Clone)]
pub struct EmbeddingOutput {
    pub embeddings: Vec<Vec<f32>>,
    pub dimensions: usize,
}

/// Sampling options sent with every generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Sampling randomness.
    pub temperature: f32,
    /// Cap on output length, in tokens.
    pub max_tokens: u32,
    /// Strings that end generation early.
    pub stop_sequences: Vec<String>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.8,
            max_tokens: 256,
            stop_sequences: Vec::new(),
        }
    }
}
