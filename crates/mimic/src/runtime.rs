// SPDX-FileCopyrightText: 2026 Mimic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wiring shared by the subcommands: embedder, store, generator, pipeline.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use mimic_agent::{PipelineSettings, ReplyPipeline};
use mimic_config::model::{EmbeddingBackend, MimicConfig};
use mimic_context::{Persona, PromptAssembler};
use mimic_core::traits::{EmbeddingAdapter, GenerationAdapter, PluginAdapter};
use mimic_core::types::HealthStatus;
use mimic_core::MimicError;
use mimic_memory::{
    ingest_file, ExampleStore, ModelManager, OllamaEmbedder, OnnxEmbedder, OnnxModel,
    PhraseExtractor, UnavailableEmbedder,
};
use mimic_ollama::{generation_options, OllamaClient};
use mimic_storage::Database;
use tracing::{info, warn};

use crate::ingest::BarProgress;

/// Creates the configured embedding backend, downloading ONNX files on first use.
pub async fn build_embedder(config: &MimicConfig) -> Result<Arc<dyn EmbeddingAdapter>, MimicError> {
    match config.embedding.backend {
        EmbeddingBackend::Onnx => {
            let model = OnnxModel::lookup(&config.embedding.model_name)?;
            let manager = ModelManager::new(config.storage.resolved_data_dir(), model);
            info!("ensuring embedding model is available...");
            let model_path = manager.ensure_model().await?;
            info!(path = %model_path.display(), "embedding model ready");
            let embedder = OnnxEmbedder::new(&model_path, &manager.tokenizer_path(), model)?;
            Ok(Arc::new(embedder))
        }
        EmbeddingBackend::Ollama => {
            let embedder = OllamaEmbedder::new(
                &config.ollama.base_url,
                &config.embedding.ollama_model,
                Duration::from_secs(config.ollama.timeout_secs),
            )?;
            Ok(Arc::new(embedder))
        }
    }
}

pub async fn open_database(config: &MimicConfig) -> Result<Database, MimicError> {
    Database::open(&config.storage.database_path, config.storage.wal_mode).await
}

pub async fn open_store(
    db: &Database,
    config: &MimicConfig,
    embedder: Arc<dyn EmbeddingAdapter>,
) -> Result<ExampleStore, MimicError> {
    let store = ExampleStore::open(db, embedder, config.embedding.model_id()).await?;
    Ok(store.with_batch_size(config.embedding.batch_size))
}

/// Ingests `ingest.conversation_file` into an empty store when enabled.
pub async fn auto_ingest(
    db: &Database,
    store: &mut ExampleStore,
    config: &MimicConfig,
) -> Result<(), MimicError> {
    if !store.is_empty() || store.phrase_count() > 0 {
        return Ok(());
    }
    let path = Path::new(&config.ingest.conversation_file);
    if !config.ingest.auto_ingest || !path.exists() {
        warn!(
            file = %path.display(),
            "example store is empty; replies will not imitate anyone until `mimic ingest` runs"
        );
        return Ok(());
    }

    info!(file = %path.display(), "example store is empty, ingesting conversation file");
    let extractor = PhraseExtractor::from_config(&config.ingest);
    ingest_file(store, path, &extractor, &BarProgress::new()).await?;
    db.checkpoint().await
}

pub fn build_generator(config: &MimicConfig) -> Result<Arc<OllamaClient>, MimicError> {
    Ok(Arc::new(OllamaClient::new(&config.ollama)?))
}

/// Opens the persisted store and fills it on first run. A store that cannot
/// be opened is replaced by an empty in-memory one so the front ends still
/// answer, without examples.
pub async fn load_store(
    config: &MimicConfig,
    embedder: Arc<dyn EmbeddingAdapter>,
) -> Result<ExampleStore, MimicError> {
    let opened = match open_database(config).await {
        Ok(db) => open_store(&db, config, embedder.clone())
            .await
            .map(|store| (db, store)),
        Err(e) => Err(e),
    };

    match opened {
        Ok((db, mut store)) => {
            if let Err(e) = auto_ingest(&db, &mut store, config).await {
                warn!(
                    error = %e,
                    "automatic ingestion failed, continuing with the store as it is"
                );
            }
            Ok(store)
        }
        Err(e) => {
            warn!(
                error = %e,
                "example store unavailable; replies will be generated without examples \
                 until `mimic ingest --rebuild` runs"
            );
            ExampleStore::open_empty(embedder).await
        }
    }
}

/// Everything a front end needs: store opened (and filled on first run),
/// persona loaded, generator checked. Only a broken generator client is fatal.
pub async fn prepare_pipeline(config: &MimicConfig) -> Result<ReplyPipeline, MimicError> {
    let store = match build_embedder(config).await {
        Ok(embedder) => load_store(config, embedder).await?,
        Err(e) => {
            warn!(
                error = %e,
                "embedding backend unavailable; replies will be generated without examples"
            );
            ExampleStore::open_empty(Arc::new(UnavailableEmbedder::new(e.to_string()))).await?
        }
    };
    info!(
        examples = store.example_count(),
        phrases = store.phrase_count(),
        "example store ready"
    );

    let generator = build_generator(config)?;
    match generator.health_check().await {
        Ok(HealthStatus::Healthy) => info!(model = generator.model(), "model server ready"),
        Ok(HealthStatus::Degraded(reason) | HealthStatus::Unhealthy(reason)) => {
            warn!(%reason, "model server not ready; replies will fall back until it is")
        }
        Err(e) => warn!(error = %e, "model server health check failed"),
    }

    let persona = Persona::load(&config.persona).await;
    Ok(assemble_pipeline(config, Arc::new(store), generator, persona))
}

pub fn assemble_pipeline(
    config: &MimicConfig,
    store: Arc<ExampleStore>,
    generator: Arc<dyn GenerationAdapter>,
    persona: Persona,
) -> ReplyPipeline {
    ReplyPipeline::new(
        store,
        generator,
        PromptAssembler::from_config(&config.prompt),
        persona,
        generation_options(&config.ollama),
        PipelineSettings::from_config(config),
    )
}
