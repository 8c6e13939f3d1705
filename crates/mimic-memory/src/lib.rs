// SPDX-FileCopyrightText: 2026 Mimic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Example memory for Mimic.
//!
//! Stores the persona's message/response pairs and frequent phrases with
//! their embeddings, and answers nearest-neighbour queries over them.
//! Embeddings come from a local ONNX sentence-transformer or from Ollama.
//!
//! Also home to the ingestion path: the WhatsApp export cleaner, the JSON
//! record loader and the phrase extractor.

pub mod embedder;
pub mod extractor;
pub mod index;
pub mod ingest;
pub mod model_manager;
pub mod ollama_embedder;
pub mod store;
pub mod types;
pub mod unavailable;
pub mod whatsapp;

pub use embedder::OnnxEmbedder;
pub use extractor::{extract, PhraseCandidate, PhraseExtractor};
pub use index::FlatIndex;
pub use ingest::{
    ingest_file, ingest_records, load_records, ConversationRecord, IngestProgress, IngestReport,
    IngestStage, NoProgress,
};
pub use model_manager::{ModelManager, OnnxModel};
pub use ollama_embedder::OllamaEmbedder;
pub use store::{inspect_store, purge_store, ExampleStore, StoreSummary};
pub use types::{cosine_similarity, ScoredExample, ScoredPhrase};
pub use unavailable::UnavailableEmbedder;
