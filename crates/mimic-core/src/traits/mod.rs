// SPDX-FileCopyrightText: 2026 Mimic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! All adapters extend [`PluginAdapter`] and use `#[async_trait]` so they
//! can be held as `Arc<dyn ...>`.

pub mod adapter;
pub mod embedding;
pub mod generation;
pub mod index;

pub use adapter::PluginAdapter;
pub use embedding::EmbeddingAdapter;
pub use generation::{GenerationAdapter, TextStream};
pub use index::VectorIndex;
