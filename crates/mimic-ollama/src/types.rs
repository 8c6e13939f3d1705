// SPDX-FileCopyrightText: 2026 Mimic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the Ollama HTTP API.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/generate`.
#[derive(Debug, Serialize)]
pub struct GenerateRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub stream: bool,
    pub options: RequestOptions<'a>,
}

/// Sampling parameters, using Ollama's option names.
#[derive(Debug, Serialize)]
pub struct RequestOptions<'a> {
    pub temperature: f32,
    pub num_predict: u32,
    #[serde(skip_serializing_if = "no_stops")]
    pub stop: &'a [String],
}

fn no_stops(stop: &&[String]) -> bool {
    stop.is_empty()
}

/// A complete response, or one NDJSON line of a streamed response.
#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub done: bool,
    /// Set instead of `response` when generation fails mid-stream.
    #[serde(default)]
    pub error: Option<String>,
}

/// Error body returned with non-success statuses.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Body of `GET /api/tags`.
#[derive(Debug, Deserialize)]
pub struct TagsResponse {
    #[serde(default)]
    pub models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
pub struct ModelTag {
    pub name: String,
}

impl TagsResponse {
    /// True when `wanted` is among the pulled models.
    pub fn contains(&self, wanted: &str) -> bool {
        self.models.iter().any(|m| same_model(&m.name, wanted))
    }
}

/// Ollama tags carry an implicit `:latest`; compare on the base name.
pub fn same_model(listed: &str, wanted: &str) -> bool {
    fn base(s: &str) -> &str {
        s.strip_suffix(":latest").unwrap_or(s)
    }
    base(listed) == base(wanted)
}
