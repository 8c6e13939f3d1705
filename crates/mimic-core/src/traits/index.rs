// SPDX-FileCopyrightText: 2026 Mimic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Nearest-neighbour index trait.

use crate::error::MimicError;

/// An in-memory similarity index over fixed-width vectors.
///
/// Positions are assigned in insertion order starting at zero. `query`
/// returns `(position, similarity)` pairs by non-increasing similarity,
/// breaking ties by position.
pub trait VectorIndex: Send + Sync {
    /// Vector width, or `None` before the first insertion.
    fn dimensions(&self) -> Option<usize>;

    /// Appends a vector and returns its position.
    fn add(&mut self, vector: Vec<f32>) -> Result<usize, MimicError>;

    /// Returns at most `k` nearest positions.
    fn query(&self, vector: &[f32], k: usize) -> Result<Vec<(usize, f32)>, MimicError>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every vector.
    fn clear(&mut self);
}
