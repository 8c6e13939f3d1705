// SPDX-FileCopyrightText: 2026 Mimic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `mimic doctor` command implementation.
//!
//! Checks the configuration, the example store, the embedding backend and
//! the model server, and prints one line per check.

use std::io::IsTerminal;
use std::path::Path;
use std::time::{Duration, Instant};

use mimic_config::model::{EmbeddingBackend, MimicConfig};
use mimic_core::traits::PluginAdapter;
use mimic_core::types::HealthStatus;
use mimic_core::MimicError;
use mimic_memory::{inspect_store, ModelManager, OllamaEmbedder, OnnxModel};
use mimic_ollama::OllamaClient;
use mimic_storage::Database;

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }
}

/// Runs `mimic doctor`. With `plain`, disables colored output.
pub async fn run_doctor(config: &MimicConfig, plain: bool) -> Result<(), MimicError> {
    let use_color = !plain && std::io::stdout().is_terminal();

    let results = vec![
        check_config(config),
        check_store(config).await,
        check_conversation_file(&config.ingest.conversation_file),
        check_embedder(config).await,
        check_model_server(config).await,
        check_memory_baseline(),
    ];

    println!();
    println!("  mimic doctor");
    println!("  {}", "-".repeat(50));

    for result in &results {
        println!("{}", format_line(result, use_color));
    }
    println!();

    let issues = results
        .iter()
        .filter(|r| r.status != CheckStatus::Pass)
        .count();
    if issues > 0 {
        let issue_word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {issue_word} found.");
    } else {
        println!("  All checks passed.");
    }
    println!();

    Ok(())
}

fn format_line(result: &CheckResult, use_color: bool) -> String {
    use colored::Colorize;

    let duration_ms = result.duration.as_millis();
    if !use_color {
        let tag = match result.status {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => "[WARN]",
            CheckStatus::Fail => "[FAIL]",
        };
        return format!(
            "    {tag} {:<20} {} ({duration_ms}ms)",
            result.name, result.message
        );
    }

    let (symbol, message) = match result.status {
        CheckStatus::Pass => ("✓".green(), result.message.normal()),
        CheckStatus::Warn => ("!".yellow(), result.message.yellow()),
        CheckStatus::Fail => ("✗".red(), result.message.red()),
    };
    format!(
        "    {symbol} {:<20} {message} ({duration_ms}ms)",
        result.name
    )
}

fn check_config(config: &MimicConfig) -> CheckResult {
    let start = Instant::now();
    CheckResult::new(
        "Configuration",
        CheckStatus::Pass,
        format!("valid (persona: {})", config.persona.name),
        start,
    )
}

/// Opens the store database and reports its contents.
async fn check_store(config: &MimicConfig) -> CheckResult {
    let start = Instant::now();
    let name = "Example store";
    let path = Path::new(&config.storage.database_path);

    if !path.exists() {
        return CheckResult::new(
            name,
            CheckStatus::Warn,
            format!(
                "not found: {} (will be created on first run)",
                path.display()
            ),
            start,
        );
    }

    let db = match Database::open(path, config.storage.wal_mode).await {
        Ok(db) => db,
        Err(e) => return CheckResult::new(name, CheckStatus::Fail, format!("open failed: {e}"), start),
    };
    let summary = match inspect_store(&db).await {
        Ok(summary) => summary,
        Err(e) => return CheckResult::new(name, CheckStatus::Fail, format!("read failed: {e}"), start),
    };

    let configured = config.embedding.model_id();
    if let Some(stored) = &summary.model
        && *stored != configured
    {
        return CheckResult::new(
            name,
            CheckStatus::Fail,
            format!("built with '{stored}' but '{configured}' is configured; run `mimic ingest --rebuild`"),
            start,
        );
    }

    let counts = format!("{} examples, {} phrases", summary.examples, summary.phrases);
    if summary.examples == 0 {
        CheckResult::new(
            name,
            CheckStatus::Warn,
            format!("{counts} (run `mimic ingest`)"),
            start,
        )
    } else {
        CheckResult::new(name, CheckStatus::Pass, counts, start)
    }
}

fn check_conversation_file(path: &str) -> CheckResult {
    let start = Instant::now();
    if Path::new(path).exists() {
        CheckResult::new("Conversation file", CheckStatus::Pass, path, start)
    } else {
        CheckResult::new(
            "Conversation file",
            CheckStatus::Warn,
            format!("not found: {path} (create one with `mimic clean`)"),
            start,
        )
    }
}

async fn check_embedder(config: &MimicConfig) -> CheckResult {
    let start = Instant::now();
    let name = "Embedding model";

    match config.embedding.backend {
        EmbeddingBackend::Onnx => {
            let model = match OnnxModel::lookup(&config.embedding.model_name) {
                Ok(model) => model,
                Err(e) => return CheckResult::new(name, CheckStatus::Fail, e.to_string(), start),
            };
            let manager = ModelManager::new(config.storage.resolved_data_dir(), model);
            if manager.is_model_available() {
                CheckResult::new(
                    name,
                    CheckStatus::Pass,
                    format!("{} ({} dims)", model.name, model.dimensions),
                    start,
                )
            } else {
                CheckResult::new(
                    name,
                    CheckStatus::Warn,
                    format!("{} not downloaded yet (fetched on first run)", model.name),
                    start,
                )
            }
        }
        EmbeddingBackend::Ollama => {
            let embedder = match OllamaEmbedder::new(
                &config.ollama.base_url,
                &config.embedding.ollama_model,
                Duration::from_secs(5),
            ) {
                Ok(embedder) => embedder,
                Err(e) => return CheckResult::new(name, CheckStatus::Fail, e.to_string(), start),
            };
            health_result(name, &config.embedding.ollama_model, embedder.health_check().await, start)
        }
    }
}

/// Asks the Ollama server whether the generation model is pulled.
async fn check_model_server(config: &MimicConfig) -> CheckResult {
    let start = Instant::now();
    let name = "Model server";
    let client = match OllamaClient::from_parts(
        &config.ollama.base_url,
        &config.ollama.model,
        Duration::from_secs(5),
        false,
    ) {
        Ok(client) => client,
        Err(e) => return CheckResult::new(name, CheckStatus::Fail, e.to_string(), start),
    };
    health_result(name, &config.ollama.model, client.health_check().await, start)
}

fn health_result(
    name: &str,
    model: &str,
    health: Result<HealthStatus, MimicError>,
    start: Instant,
) -> CheckResult {
    match health {
        Ok(HealthStatus::Healthy) => CheckResult::new(name, CheckStatus::Pass, format!("{model} ready"), start),
        Ok(HealthStatus::Degraded(reason)) => CheckResult::new(name, CheckStatus::Warn, reason, start),
        Ok(HealthStatus::Unhealthy(reason)) => CheckResult::new(name, CheckStatus::Fail, reason, start),
        Err(e) => CheckResult::new(name, CheckStatus::Fail, e.to_string(), start),
    }
}

fn check_memory_baseline() -> CheckResult {
    let start = Instant::now();

    #[cfg(not(target_env = "msvc"))]
    {
        let _ = tikv_jemalloc_ctl::epoch::advance();
        let allocated = tikv_jemalloc_ctl::stats::allocated::read().unwrap_or(0);
        let resident = tikv_jemalloc_ctl::stats::resident::read().unwrap_or(0);
        let allocated_mb = allocated as f64 / (1024.0 * 1024.0);
        let resident_mb = resident as f64 / (1024.0 * 1024.0);

        CheckResult::new(
            "Memory baseline",
            CheckStatus::Pass,
            format!("heap: {allocated_mb:.1} MB, resident: {resident_mb:.1} MB"),
            start,
        )
    }

    #[cfg(target_env = "msvc")]
    {
        CheckResult::new(
            "Memory baseline",
            CheckStatus::Warn,
            "jemalloc not available on MSVC",
            start,
        )
    }
}
