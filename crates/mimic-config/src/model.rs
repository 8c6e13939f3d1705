// SPDX-FileCopyrightText: 2026 Mimic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key is
//! reported at startup instead of being silently ignored.

use serde::{Deserialize, Serialize};

/// Top-level Mimic configuration.
///
/// Every section is optional and falls back to the defaults below.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MimicConfig {
    /// Process-level settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Who the replies imitate.
    #[serde(default)]
    pub persona: PersonaConfig,

    /// SQLite database and model cache locations.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Embedding backend used for examples, phrases and queries.
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Offline ingestion of historical conversations.
    #[serde(default)]
    pub ingest: IngestConfig,

    /// How much is retrieved per turn.
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Prompt assembly limits.
    #[serde(default)]
    pub prompt: PromptConfig,

    /// Local Ollama model server.
    #[serde(default)]
    pub ollama: OllamaConfig,

    /// Conversation history window.
    #[serde(default)]
    pub session: SessionConfig,

    /// Browser chat widget.
    #[serde(default)]
    pub web: WebConfig,
}

/// Process-level settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// The persona whose texting style is imitated.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PersonaConfig {
    /// Display name, used in the prompt and both front ends.
    #[serde(default = "default_persona_name")]
    pub name: String,

    /// Inline style description. Overridden by `description_file` if both set.
    #[serde(default)]
    pub description: Option<String>,

    /// Path to a text file holding the style description.
    #[serde(default)]
    pub description_file: Option<String>,

    /// Line printed when the console session ends.
    #[serde(default = "default_farewell")]
    pub farewell: String,

    /// Reply shown when the model cannot produce one.
    #[serde(default = "default_fallback_reply")]
    pub fallback_reply: String,
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            name: default_persona_name(),
            description: None,
            description_file: None,
            farewell: default_farewell(),
            fallback_reply: default_fallback_reply(),
        }
    }
}

fn default_persona_name() -> String {
    "Saman".to_string()
}

fn default_farewell() -> String {
    "Khuda hafiz!".to_string()
}

fn default_fallback_reply() -> String {
    "sorry yr, abhi reply nahi kar sakti. thori dair baad try karo".to_string()
}

/// Storage locations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database holding examples and phrases.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Directory for downloaded embedding models. Defaults to the database's directory.
    #[serde(default)]
    pub data_dir: Option<String>,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            data_dir: None,
            wal_mode: default_wal_mode(),
        }
    }
}

impl StorageConfig {
    /// Directory used for model downloads.
    pub fn resolved_data_dir(&self) -> std::path::PathBuf {
        match &self.data_dir {
            Some(dir) if !dir.trim().is_empty() => std::path::PathBuf::from(dir),
            _ => std::path::Path::new(&self.database_path)
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| std::path::PathBuf::from(".")),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("mimic").join("mimic.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("mimic.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Which embedding backend produces vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// Local ONNX Runtime inference with a downloaded sentence-transformer.
    Onnx,
    /// The Ollama `/api/embed` endpoint.
    Ollama,
}

/// Embedding settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_backend")]
    pub backend: EmbeddingBackend,

    /// ONNX sentence-transformer name (see `mimic doctor` for supported names).
    #[serde(default = "default_embedding_model")]
    pub model_name: String,

    /// Model used when `backend = "ollama"`.
    #[serde(default = "default_ollama_embedding_model")]
    pub ollama_model: String,

    /// Texts embedded per call during ingestion.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: default_embedding_backend(),
            model_name: default_embedding_model(),
            ollama_model: default_ollama_embedding_model(),
            batch_size: default_batch_size(),
        }
    }
}

impl EmbeddingConfig {
    /// Identifier recorded in the store so a model change is detected on open.
    pub fn model_id(&self) -> String {
        match self.backend {
            EmbeddingBackend::Onnx => format!("onnx:{}", self.model_name),
            EmbeddingBackend::Ollama => format!("ollama:{}", self.ollama_model),
        }
    }
}

fn default_embedding_backend() -> EmbeddingBackend {
    EmbeddingBackend::Onnx
}

fn default_embedding_model() -> String {
    "paraphrase-multilingual-MiniLM-L12-v2".to_string()
}

fn default_ollama_embedding_model() -> String {
    "nomic-embed-text".to_string()
}

fn default_batch_size() -> usize {
    32
}

/// Offline ingestion settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IngestConfig {
    /// JSON array of `{context, response, timestamp}` records.
    #[serde(default = "default_conversation_file")]
    pub conversation_file: String,

    /// Ingest `conversation_file` before `shell`/`serve` when the store is empty.
    #[serde(default = "default_auto_ingest")]
    pub auto_ingest: bool,

    /// Minimum occurrences for a span to count as a phrase.
    #[serde(default = "default_min_phrase_frequency")]
    pub min_phrase_frequency: u32,

    /// Shortest phrase, in tokens.
    #[serde(default = "default_min_phrase_length")]
    pub min_phrase_length: usize,

    /// Longest phrase, in tokens.
    #[serde(default = "default_max_phrase_length")]
    pub max_phrase_length: usize,

    /// Phrases kept after ranking by frequency.
    #[serde(default = "default_max_phrases")]
    pub max_phrases: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            conversation_file: default_conversation_file(),
            auto_ingest: default_auto_ingest(),
            min_phrase_frequency: default_min_phrase_frequency(),
            min_phrase_length: default_min_phrase_length(),
            max_phrase_length: default_max_phrase_length(),
            max_phrases: default_max_phrases(),
        }
    }
}

fn default_conversation_file() -> String {
    "conversations.json".to_string()
}

fn default_auto_ingest() -> bool {
    true
}

fn default_min_phrase_frequency() -> u32 {
    5
}

fn default_min_phrase_length() -> usize {
    1
}

fn default_max_phrase_length() -> usize {
    5
}

fn default_max_phrases() -> usize {
    30
}

/// Per-turn retrieval settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetrievalConfig {
    /// Examples placed in each prompt.
    #[serde(default = "default_examples_per_prompt")]
    pub examples_per_prompt: usize,

    /// Phrases placed in each prompt.
    #[serde(default = "default_phrases_per_prompt")]
    pub phrases_per_prompt: usize,

    /// Answer with a stored response when the message nearly repeats a stored one.
    #[serde(default = "default_direct_match")]
    pub direct_match: bool,

    /// Word overlap a direct match must exceed (0.0 to 1.0).
    #[serde(default = "default_direct_match_overlap")]
    pub direct_match_overlap: f64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            examples_per_prompt: default_examples_per_prompt(),
            phrases_per_prompt: default_phrases_per_prompt(),
            direct_match: default_direct_match(),
            direct_match_overlap: default_direct_match_overlap(),
        }
    }
}

fn default_examples_per_prompt() -> usize {
    5
}

fn default_phrases_per_prompt() -> usize {
    10
}

fn default_direct_match() -> bool {
    true
}

fn default_direct_match_overlap() -> f64 {
    0.5
}

/// Prompt assembly limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PromptConfig {
    /// Maximum prompt length in characters.
    #[serde(default = "default_max_prompt_chars")]
    pub max_prompt_chars: usize,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            max_prompt_chars: default_max_prompt_chars(),
        }
    }
}

fn default_max_prompt_chars() -> usize {
    8000
}

/// Ollama model server settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OllamaConfig {
    #[serde(default = "default_ollama_url")]
    pub base_url: String,

    /// Generation model tag.
    #[serde(default = "default_ollama_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default)]
    pub stop_sequences: Vec<String>,

    /// Deadline for a complete reply.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retry once when the deadline passes.
    #[serde(default)]
    pub retry_on_timeout: bool,

    /// Print console replies as they are generated.
    #[serde(default = "default_stream")]
    pub stream: bool,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_ollama_url(),
            model: default_ollama_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            stop_sequences: Vec::new(),
            timeout_secs: default_timeout_secs(),
            retry_on_timeout: false,
            stream: default_stream(),
        }
    }
}

fn default_ollama_url() -> String {
    "http://127.0.0.1:11434".to_string()
}

fn default_ollama_model() -> String {
    "llama3:8b".to_string()
}

fn default_temperature() -> f32 {
    0.8
}

fn default_max_tokens() -> u32 {
    256
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_stream() -> bool {
    true
}

/// Conversation history settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Turns kept in each session's history window.
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Concurrent web sessions kept before the least recently used is dropped.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            history_capacity: default_history_capacity(),
            max_sessions: default_max_sessions(),
        }
    }
}

fn default_history_capacity() -> usize {
    5
}

fn default_max_sessions() -> usize {
    256
}

/// Browser chat widget settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WebConfig {
    #[serde(default = "default_web_host")]
    pub host: String,

    #[serde(default = "default_web_port")]
    pub port: u16,

    /// Page title. Defaults to "Chat with {persona.name}".
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default = "default_web_description")]
    pub description: String,

    /// Clickable starter messages shown under the input box.
    #[serde(default = "default_example_prompts")]
    pub example_prompts: Vec<String>,

    /// Upper bound on one web turn, including retrieval.
    #[serde(default = "default_turn_timeout_secs")]
    pub turn_timeout_secs: u64,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_web_host(),
            port: default_web_port(),
            title: None,
            description: default_web_description(),
            example_prompts: default_example_prompts(),
            turn_timeout_secs: default_turn_timeout_secs(),
        }
    }
}

fn default_web_host() -> String {
    "127.0.0.1".to_string()
}

fn default_web_port() -> u16 {
    7860
}

fn default_web_description() -> String {
    "A memory-based chatbot trained on WhatsApp conversations".to_string()
}

fn default_example_prompts() -> Vec<String> {
    vec![
        "Aslam alikum".to_string(),
        "Kya hal ha?".to_string(),
        "Kya kr rhe ho".to_string(),
    ]
}

fn default_turn_timeout_secs() -> u64 {
    150
}
