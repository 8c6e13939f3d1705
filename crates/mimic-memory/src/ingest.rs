// SPDX-FileCopyrightText: 2026 Mimic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Batch ingestion of conversation records into the example store.
//!
//! Records with both a context and a response become examples. Every
//! non-empty response feeds the phrase extractor, standalone messages
//! included.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use mimic_core::MimicError;

use crate::extractor::PhraseExtractor;
use crate::store::ExampleStore;

/// One entry of the JSON ingestion format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationRecord {
    /// What the persona was replying to. Empty for a standalone message.
    #[serde(default)]
    pub context: String,
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl ConversationRecord {
    /// The `(source_message, response)` pair, if this record is a reply.
    pub fn as_pair(&self) -> Option<(String, String)> {
        let context = self.context.trim();
        let response = self.response.trim();
        (!context.is_empty() && !response.is_empty())
            .then(|| (context.to_string(), response.to_string()))
    }
}

/// Which part of ingestion a progress callback refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStage {
    Examples,
    Phrases,
}

impl fmt::Display for IngestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestStage::Examples => f.write_str("embedding examples"),
            IngestStage::Phrases => f.write_str("embedding phrases"),
        }
    }
}

/// Receives ingestion progress. All methods default to no-ops.
pub trait IngestProgress: Send + Sync {
    fn start(&self, _stage: IngestStage, _total: u64) {}
    fn advance(&self, _n: u64) {}
    fn finish(&self, _stage: IngestStage) {}
}

/// Discards progress.
pub struct NoProgress;

impl IngestProgress for NoProgress {}

/// Counts from a completed ingestion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub records: usize,
    pub examples: usize,
    /// Records without a context, used for phrases only.
    pub standalone: usize,
    pub phrases: usize,
}

/// Reads a JSON array of [`ConversationRecord`]s.
pub async fn load_records(path: &Path) -> Result<Vec<ConversationRecord>, MimicError> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        MimicError::Config(format!(
            "cannot read conversation file {}: {e}",
            path.display()
        ))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        MimicError::Config(format!(
            "{} is not a JSON array of conversation records: {e}",
            path.display()
        ))
    })
}

/// Embeds and stores `records`, then mines and stores frequent phrases.
pub async fn ingest_records(
    store: &mut ExampleStore,
    records: &[ConversationRecord],
    extractor: &PhraseExtractor,
    progress: &dyn IngestProgress,
) -> Result<IngestReport, MimicError> {
    let pairs: Vec<(String, String)> = records.iter().filter_map(ConversationRecord::as_pair).collect();
    let responses: Vec<&str> = records
        .iter()
        .map(|r| r.response.trim())
        .filter(|r| !r.is_empty())
        .collect();

    progress.start(IngestStage::Examples, pairs.len() as u64);
    let examples = store.add_examples_with_progress(pairs, progress).await?;
    progress.finish(IngestStage::Examples);

    let candidates = extractor.extract(&responses);
    progress.start(IngestStage::Phrases, candidates.len() as u64);
    let count = candidates.len() as u64;
    let phrases = store.add_phrases(candidates).await?;
    progress.advance(count);
    progress.finish(IngestStage::Phrases);

    let report = IngestReport {
        records: records.len(),
        examples: examples.len(),
        standalone: records
            .iter()
            .filter(|r| r.context.trim().is_empty() && !r.response.trim().is_empty())
            .count(),
        phrases: phrases.len(),
    };
    info!(
        records = report.records,
        examples = report.examples,
        phrases = report.phrases,
        "ingestion complete"
    );
    Ok(report)
}

/// [`load_records`] followed by [`ingest_records`].
pub async fn ingest_file(
    store: &mut ExampleStore,
    path: &Path,
    extractor: &PhraseExtractor,
    progress: &dyn IngestProgress,
) -> Result<IngestReport, MimicError> {
    let records = load_records(path).await?;
    ingest_records(store, &records, extractor, progress).await
}
