// SPDX-FileCopyrightText: 2026 Mimic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Exact cosine index.

use std::cmp::Ordering;

use mimic_core::traits::VectorIndex;
use mimic_core::MimicError;

use crate::types::{cosine_with_norms, norm};

/// Brute-force cosine scan over every stored vector.
///
/// Norms are cached on insert, so a query costs one dot product per entry.
#[derive(Debug, Default)]
pub struct FlatIndex {
    dimensions: Option<usize>,
    vectors: Vec<Vec<f32>>,
    norms: Vec<f32>,
}

impl FlatIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_width(&self, len: usize) -> Result<(), MimicError> {
        match self.dimensions {
            Some(d) if d != len => Err(MimicError::Embedding(format!(
                "vector has {len} dimensions, index expects {d}"
            ))),
            _ => Ok(()),
        }
    }
}

impl VectorIndex for FlatIndex {
    fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }

    fn add(&mut self, vector: Vec<f32>) -> Result<usize, MimicError> {
        self.check_width(vector.len())?;
        if vector.is_empty() {
            return Err(MimicError::Embedding("empty vector".to_string()));
        }
        self.dimensions = Some(vector.len());
        self.norms.push(norm(&vector));
        self.vectors.push(vector);
        Ok(self.vectors.len() - 1)
    }

    fn query(&self, vector: &[f32], k: usize) -> Result<Vec<(usize, f32)>, MimicError> {
        if k == 0 || self.vectors.is_empty() {
            return Ok(Vec::new());
        }
        self.check_width(vector.len())?;

        let query_norm = norm(vector);
        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .zip(&self.norms)
            .enumerate()
            .map(|(i, (v, n))| (i, cosine_with_norms(vector, query_norm, v, *n)))
            .collect();

        // Stable sort: equal scores stay in insertion order.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }

    fn len(&self) -> usize {
        self.vectors.len()
    }

    fn clear(&mut self) {
        self.vectors.clear();
        self.norms.clear();
        self.dimensions = None;
    }
}
