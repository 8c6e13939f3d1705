// SPDX-FileCopyrightText: 2026 Mimic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! ONNX embedding adapter for local inference.
//!
//! Runs a sentence-transformer on CPU with attention-masked mean pooling and
//! L2 normalization. Texts are encoded in padded batches.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use ndarray::Array2;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::TensorRef;
use tokenizers::{PaddingParams, Tokenizer, TruncationParams};

use mimic_core::traits::adapter::PluginAdapter;
use mimic_core::traits::EmbeddingAdapter;
use mimic_core::types::{EmbeddingInput, EmbeddingOutput, HealthStatus};
use mimic_core::MimicError;

use crate::model_manager::OnnxModel;

/// Longest token sequence fed to the model.
const MAX_SEQUENCE_LENGTH: usize = 256;

fn onnx_err<E: std::fmt::Display>(what: &str) -> impl Fn(E) -> MimicError + '_ {
    move |e| MimicError::Embedding(format!("{what}: {e}"))
}

/// ONNX-based embedding adapter.
pub struct OnnxEmbedder {
    /// ONNX Runtime session (not Send, wrapped in Mutex for safety).
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    model: &'static OnnxModel,
}

// Safety: Session is accessed through Mutex which provides synchronization.
// The tokenizer is thread-safe for encoding operations.
unsafe impl Send for OnnxEmbedder {}
unsafe impl Sync for OnnxEmbedder {}

impl OnnxEmbedder {
    /// Loads the model graph and tokenizer from disk.
    pub fn new(
        model_path: &Path,
        tokenizer_path: &Path,
        model: &'static OnnxModel,
    ) -> Result<Self, MimicError> {
        let mut tokenizer = Tokenizer::from_file(tokenizer_path).map_err(|e| {
            MimicError::Embedding(format!(
                "failed to load tokenizer from {}: {e}",
                tokenizer_path.display()
            ))
        })?;
        tokenizer.with_padding(Some(PaddingParams::default()));
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_SEQUENCE_LENGTH,
                ..Default::default()
            }))
            .map_err(|e| MimicError::Embedding(format!("invalid truncation settings: {e}")))?;

        let session = Session::builder()
            .map_err(onnx_err("failed to create ONNX session builder"))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(onnx_err("failed to set optimization level"))?
            .with_intra_threads(1)
            .map_err(onnx_err("failed to set thread count"))?
            .commit_from_file(model_path)
            .map_err(|e| {
                MimicError::Embedding(format!(
                    "failed to load ONNX model from {}: {e}",
                    model_path.display()
                ))
            })?;

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            model,
        })
    }

    /// Embed a batch of texts, one normalized vector per text.
    pub fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, MimicError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| MimicError::Embedding(format!("tokenization failed: {e}")))?;

        let batch = encodings.len();
        let seq_len = encodings.iter().map(|e| e.get_ids().len()).max().unwrap_or(0);

        let mut input_ids = Vec::with_capacity(batch * seq_len);
        let mut attention_mask = Vec::with_capacity(batch * seq_len);
        let mut token_type_ids = Vec::with_capacity(batch * seq_len);
        for encoding in &encodings {
            input_ids.extend(encoding.get_ids().iter().map(|&id| id as i64));
            attention_mask.extend(encoding.get_attention_mask().iter().map(|&m| m as i64));
            token_type_ids.extend(encoding.get_type_ids().iter().map(|&t| t as i64));
        }

        let shape_err =
            |e: ndarray::ShapeError| MimicError::Embedding(format!("bad input tensor shape: {e}"));
        let input_ids_array = Array2::from_shape_vec((batch, seq_len), input_ids).map_err(shape_err)?;
        let attention_mask_array =
            Array2::from_shape_vec((batch, seq_len), attention_mask.clone()).map_err(shape_err)?;
        let token_type_ids_array =
            Array2::from_shape_vec((batch, seq_len), token_type_ids).map_err(shape_err)?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| MimicError::Embedding(format!("failed to lock ONNX session: {e}")))?;

        let input_ids_tensor = TensorRef::from_array_view(&input_ids_array)
            .map_err(onnx_err("failed to create input_ids tensor"))?;
        let attention_mask_tensor = TensorRef::from_array_view(&attention_mask_array)
            .map_err(onnx_err("failed to create attention_mask tensor"))?;

        let outputs = if self.model.token_type_ids {
            let token_type_ids_tensor = TensorRef::from_array_view(&token_type_ids_array)
                .map_err(onnx_err("failed to create token_type_ids tensor"))?;
            session.run(ort::inputs![
                "input_ids" => input_ids_tensor,
                "attention_mask" => attention_mask_tensor,
                "token_type_ids" => token_type_ids_tensor
            ])
        } else {
            session.run(ort::inputs![
                "input_ids" => input_ids_tensor,
                "attention_mask" => attention_mask_tensor
            ])
        }
        .map_err(onnx_err("ONNX inference failed"))?;

        // Shape [batch, seq_len, hidden].
        let (shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(onnx_err("failed to extract output tensor"))?;
        let hidden_size = shape[shape.len() - 1] as usize;
        let stride = seq_len * hidden_size;

        let vectors = (0..batch)
            .map(|row| {
                let pooled = mean_pool_with_attention(
                    &data[row * stride..(row + 1) * stride],
                    &attention_mask[row * seq_len..(row + 1) * seq_len],
                    seq_len,
                    hidden_size,
                );
                l2_normalize(&pooled)
            })
            .collect();
        Ok(vectors)
    }
}

/// Apply attention-masked mean pooling over token embeddings.
fn mean_pool_with_attention(
    embeddings: &[f32],
    attention_mask: &[i64],
    seq_len: usize,
    hidden_size: usize,
) -> Vec<f32> {
    let mut sum = vec![0.0f32; hidden_size];
    let mut count = 0.0f32;

    for i in 0..seq_len {
        if attention_mask[i] > 0 {
            for j in 0..hidden_size {
                sum[j] += embeddings[i * hidden_size + j];
            }
            count += 1.0;
        }
    }

    if count > 0.0 {
        for val in &mut sum {
            *val /= count;
        }
    }

    sum
}

fn l2_normalize(vec: &[f32]) -> Vec<f32> {
    let norm: f32 = vec.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        vec.iter().map(|v| v / norm).collect()
    } else {
        vec.to_vec()
    }
}

#[async_trait]
impl PluginAdapter for OnnxEmbedder {
    async fn health_check(&self) -> Result<HealthStatus, MimicError> {
        match self.session.lock() {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!("session lock poisoned: {e}"))),
        }
    }
}

#[async_trait]
impl EmbeddingAdapter for OnnxEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, MimicError> {
        let embeddings = self.embed_batch(&input.texts)?;
        Ok(EmbeddingOutput {
            embeddings,
            dimensions: self.model.dimensions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn l2_normalize_general_vector() {
        let n = l2_normalize(&[3.0, 4.0]);
        assert!((n[0] - 0.6).abs() < 0.001);
        assert!((n[1] - 0.8).abs() < 0.001);
    }

    #[test]
    fn l2_normalize_zero_vector() {
        assert_eq!(l2_normalize(&[0.0, 0.0, 0.0]), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn padding_tokens_do_not_affect_pooling() {
        // 3 tokens, hidden_size=2, last token is padding.
        let embeddings = vec![1.0, 2.0, 3.0, 4.0, 100.0, 100.0];
        let result = mean_pool_with_attention(&embeddings, &[1, 1, 0], 3, 2);
        assert_eq!(result, vec![2.0, 3.0]);
    }

    #[test]
    fn fully_masked_row_pools_to_zero() {
        let result = mean_pool_with_attention(&[5.0, 5.0], &[0], 1, 2);
        assert_eq!(result, vec![0.0, 0.0]);
    }

    // OnnxEmbedder::new needs real model files; the store tests run
    // against the mock embedder instead.
}
