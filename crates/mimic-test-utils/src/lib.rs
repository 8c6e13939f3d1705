// SPDX-FileCopyrightText: 2026 Mimic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Mimic integration tests.
//!
//! Provides mock adapters and fixtures for fast, deterministic tests that
//! need neither ONNX model files nor a running model server.
//!
//! # Components
//!
//! - [`MockEmbedder`] - Deterministic hashed n-gram embeddings
//! - [`MockGenerator`] - Generation adapter with scripted replies and failures
//! - [`fixtures`] - Small Roman Urdu conversation corpus

pub mod fixtures;
pub mod mock_embedder;
pub mod mock_generator;

pub use mock_embedder::MockEmbedder;
pub use mock_generator::{MockGenerator, MockReply};
