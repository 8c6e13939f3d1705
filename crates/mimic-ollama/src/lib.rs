// SPDX-FileCopyrightText: 2026 Mimic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ollama generation client for Mimic.
//!
//! Talks to a local Ollama server over its native HTTP API, either waiting
//! for the whole reply or streaming it as newline-delimited JSON.

pub mod client;
pub mod stream;
pub mod types;

pub use client::{generation_options, OllamaClient};
pub use types::{same_model, TagsResponse};
