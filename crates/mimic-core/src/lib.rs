// SPDX-FileCopyrightText: 2026 Mimic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Mimic.
//!
//! Holds the error type, the domain types that cross crate boundaries
//! (examples, phrases, turns) and the adapter traits that the embedding
//! and generation backends implement.

pub mod error;
pub mod traits;
pub mod types;

pub use error::MimicError;
pub use types::{
    EmbeddingInput, EmbeddingOutput, Example, GenerationOptions, HealthStatus, Phrase, Scored,
    Turn,
};

pub use traits::{EmbeddingAdapter, GenerationAdapter, PluginAdapter, TextStream, VectorIndex};
