// SPDX-FileCopyrightText: 2026 Mimic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generation adapter trait for locally served language models.

use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;

use crate::error::MimicError;
use crate::traits::adapter::PluginAdapter;
use crate::types::GenerationOptions;

/// A lazily produced sequence of reply fragments.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, MimicError>> + Send>>;

/// Sends an assembled prompt to a language model and returns its reply.
#[async_trait]
pub trait GenerationAdapter: PluginAdapter {
    /// Blocks until the complete reply is available.
    ///
    /// Fails with [`MimicError::ModelUnavailable`] when the model server
    /// cannot be reached and [`MimicError::GenerationTimeout`] when the
    /// configured deadline passes.
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, MimicError>;

    /// Streams the reply as it is produced.
    async fn generate_stream(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<TextStream, MimicError>;
}
