// SPDX-FileCopyrightText: 2026 Mimic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types shared by every Mimic crate.

use std::time::Duration;

use thiserror::Error;

/// The primary error type used across all Mimic adapters and pipeline stages.
#[derive(Debug, Error)]
pub enum MimicError {
    /// Configuration errors (invalid TOML, unsupported model, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// SQLite errors while writing or maintaining the database.
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The example store could not be opened or loaded.
    #[error("example store unavailable: {0}")]
    StoreUnavailable(String),

    /// A similarity query was made against a store with no entries.
    #[error("example store is empty")]
    EmptyStore,

    /// Embedding inference failed or produced an unusable vector.
    #[error("embedding error: {0}")]
    Embedding(String),

    /// The model-serving process could not be reached or refused the model.
    #[error("model unavailable: {message}")]
    ModelUnavailable {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// No complete response arrived within the generation deadline.
    #[error("generation timed out after {duration:?}")]
    GenerationTimeout { duration: Duration },

    /// The prompt could not be truncated to fit its length budget.
    #[error("prompt of {length} characters exceeds the {max} character budget")]
    PromptTooLong { length: usize, max: usize },

    /// The model server answered with something we could not use.
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
