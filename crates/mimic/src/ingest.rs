// SPDX-FileCopyrightText: 2026 Mimic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `mimic ingest` command implementation.

use std::path::PathBuf;
use std::sync::Mutex;

use indicatif::{ProgressBar, ProgressStyle};
use mimic_config::model::MimicConfig;
use mimic_core::MimicError;
use mimic_memory::{ingest_file, purge_store, IngestProgress, IngestStage, PhraseExtractor};

use crate::runtime;

/// Terminal progress bar for ingestion stages.
#[derive(Default)]
pub struct BarProgress {
    bar: Mutex<Option<ProgressBar>>,
}

impl BarProgress {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_bar(&self, f: impl FnOnce(&mut Option<ProgressBar>)) {
        if let Ok(mut bar) = self.bar.lock() {
            f(&mut bar);
        }
    }
}

impl IngestProgress for BarProgress {
    fn start(&self, stage: IngestStage, total: u64) {
        let style = ProgressStyle::with_template("{msg:>20} [{bar:30}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        let bar = ProgressBar::new(total).with_style(style).with_message(stage.to_string());
        self.with_bar(|slot| *slot = Some(bar));
    }

    fn advance(&self, n: u64) {
        self.with_bar(|slot| {
            if let Some(bar) = slot {
                bar.inc(n);
            }
        });
    }

    fn finish(&self, _stage: IngestStage) {
        self.with_bar(|slot| {
            if let Some(bar) = slot.take() {
                bar.finish();
            }
        });
    }
}

/// Runs `mimic ingest`.
///
/// Refuses to add to a store that already has content unless `rebuild` is
/// set, in which case the store is emptied first.
pub async fn run_ingest(
    config: &MimicConfig,
    file: Option<PathBuf>,
    rebuild: bool,
) -> Result<(), MimicError> {
    let path = file.unwrap_or_else(|| PathBuf::from(&config.ingest.conversation_file));
    if !path.exists() {
        return Err(MimicError::Config(format!(
            "conversation file not found: {} (create one with `mimic clean`)",
            path.display()
        )));
    }

    let embedder = runtime::build_embedder(config).await?;
    let db = runtime::open_database(config).await?;
    if rebuild {
        purge_store(&db).await?;
    }
    let mut store = runtime::open_store(&db, config, embedder).await?;
    if !store.is_empty() || store.phrase_count() > 0 {
        println!(
            "store already holds {} examples and {} phrases; run with --rebuild to replace them",
            store.example_count(),
            store.phrase_count()
        );
        return Ok(());
    }

    let extractor = PhraseExtractor::from_config(&config.ingest);
    let report = ingest_file(&mut store, &path, &extractor, &BarProgress::new()).await?;
    db.checkpoint().await?;

    println!(
        "ingested {} records: {} examples, {} standalone messages, {} phrases",
        report.records, report.examples, report.standalone, report.phrases
    );
    Ok(())
}
