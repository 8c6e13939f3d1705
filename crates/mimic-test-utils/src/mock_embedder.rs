// SPDX-FileCopyrightText: 2026 Mimic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic embedding adapter for tests.
//!
//! Each text becomes a bag of lowercase words and character trigrams hashed
//! into a fixed number of buckets, then L2-normalized. Texts that share
//! words land close together, which is enough to exercise nearest-neighbour
//! retrieval without a real model.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use mimic_core::traits::adapter::PluginAdapter;
use mimic_core::traits::EmbeddingAdapter;
use mimic_core::types::{EmbeddingInput, EmbeddingOutput, HealthStatus};
use mimic_core::MimicError;

/// Default vector width.
pub const MOCK_DIMENSIONS: usize = 64;

/// A hashing embedder with no model files.
pub struct MockEmbedder {
    dimensions: usize,
    fail: bool,
    calls: AtomicUsize,
}

impl MockEmbedder {
    /// Create an embedder producing [`MOCK_DIMENSIONS`]-wide vectors.
    pub fn new() -> Self {
        Self::with_dimensions(MOCK_DIMENSIONS)
    }

    pub fn with_dimensions(dimensions: usize) -> Self {
        Self {
            dimensions,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// An embedder whose every call fails with [`MimicError::Embedding`].
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    /// Number of `embed` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Embed one text synchronously.
    pub fn vector(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dimensions];
        let lower = text.to_lowercase();
        for word in lower.split_whitespace() {
            v[bucket(word, self.dimensions)] += 2.0;
            let padded: Vec<char> = format!("#{word}#").chars().collect();
            for gram in padded.windows(3) {
                let gram: String = gram.iter().collect();
                v[bucket(&gram, self.dimensions)] += 1.0;
            }
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            v.iter_mut().for_each(|x| *x /= norm);
        }
        v
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

/// FNV-1a, so vectors are stable across runs and platforms.
fn bucket(token: &str, dimensions: usize) -> usize {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in token.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0100_0000_01b3);
    }
    (hash % dimensions as u64) as usize
}

#[async_trait]
impl PluginAdapter for MockEmbedder {
    async fn health_check(&self) -> Result<HealthStatus, MimicError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl EmbeddingAdapter for MockEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, MimicError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(MimicError::Embedding("mock embedder failure".to_string()));
        }
        Ok(EmbeddingOutput {
            embeddings: input.texts.iter().map(|t| self.vector(t)).collect(),
            dimensions: self.dimensions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn vectors_are_deterministic_and_normalized() {
        let e = MockEmbedder::new();
        let a = e.vector("kya haal hai");
        assert_eq!(a, e.vector("kya haal hai"));
        let norm = dot(&a, &a).sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn shared_words_score_higher_than_unrelated_text() {
        let e = MockEmbedder::new();
        let q = e.vector("kya haal h");
        let near = e.vector("Kya hal ha?");
        let far = e.vector("movie chalein?");
        assert!(dot(&q, &near) > dot(&q, &far));
    }

    #[test]
    fn empty_text_is_zero_vector() {
        let e = MockEmbedder::with_dimensions(8);
        assert_eq!(e.vector(""), vec![0.0; 8]);
    }

    #[tokio::test]
    async fn failing_embedder_errors_and_counts_calls() {
        let e = MockEmbedder::failing();
        let err = e.embed(EmbeddingInput::single("x")).await.unwrap_err();
        assert!(matches!(err, MimicError::Embedding(_)));
        assert_eq!(e.calls(), 1);
    }
}
