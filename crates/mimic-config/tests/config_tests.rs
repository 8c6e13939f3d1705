// SPDX-FileCopyrightText: 2026 Mimic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Mimic configuration system.

use mimic_config::diagnostic::ConfigError;
use mimic_config::model::{EmbeddingBackend, MimicConfig};
use mimic_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};

#[test]
fn empty_toml_yields_documented_defaults() {
    let config = load_config_from_str("").expect("empty TOML should load");
    assert_eq!(config.persona.name, "Saman");
    assert_eq!(config.persona.farewell, "Khuda hafiz!");
    assert_eq!(config.ollama.model, "llama3:8b");
    assert_eq!(config.ollama.base_url, "http://127.0.0.1:11434");
    assert_eq!(config.ollama.timeout_secs, 120);
    assert!(!config.ollama.retry_on_timeout);
    assert_eq!(config.ingest.min_phrase_frequency, 5);
    assert_eq!(config.ingest.max_phrase_length, 5);
    assert_eq!(config.ingest.max_phrases, 30);
    assert_eq!(config.retrieval.examples_per_prompt, 5);
    assert_eq!(config.retrieval.phrases_per_prompt, 10);
    assert_eq!(config.prompt.max_prompt_chars, 8000);
    assert_eq!(config.session.history_capacity, 5);
    assert_eq!(config.embedding.backend, EmbeddingBackend::Onnx);
    assert_eq!(config.web.example_prompts.len(), 3);
}

#[test]
fn full_toml_deserializes() {
    let toml = r#"
[agent]
log_level = "debug"

[persona]
name = "Ali"
description = "Short replies, lots of emojis."
farewell = "bye!"

[storage]
database_path = "/tmp/mimic-test.db"
wal_mode = false

[embedding]
backend = "ollama"
ollama_model = "mxbai-embed-large"
batch_size = 8

[ingest]
conversation_file = "ali.json"
auto_ingest = false
min_phrase_frequency = 3
max_phrase_length = 3

[retrieval]
examples_per_prompt = 3
direct_match = false

[prompt]
max_prompt_chars = 4000

[ollama]
model = "mistral"
temperature = 0.3
stop_sequences = ["\nFriend:"]
retry_on_timeout = true

[session]
history_capacity = 3

[web]
port = 8080
title = "Chat with Ali"
example_prompts = ["hi"]
"#;

    let config = load_and_validate_str(toml).expect("valid TOML should load");
    assert_eq!(config.agent.log_level, "debug");
    assert_eq!(config.persona.name, "Ali");
    assert_eq!(
        config.persona.description.as_deref(),
        Some("Short replies, lots of emojis.")
    );
    assert!(!config.storage.wal_mode);
    assert_eq!(config.embedding.backend, EmbeddingBackend::Ollama);
    assert_eq!(config.embedding.model_id(), "ollama:mxbai-embed-large");
    assert_eq!(config.ingest.conversation_file, "ali.json");
    assert!(!config.ingest.auto_ingest);
    assert_eq!(config.ingest.min_phrase_frequency, 3);
    assert_eq!(config.retrieval.examples_per_prompt, 3);
    assert!(!config.retrieval.direct_match);
    assert_eq!(config.prompt.max_prompt_chars, 4000);
    assert_eq!(config.ollama.model, "mistral");
    assert_eq!(config.ollama.stop_sequences, vec!["\nFriend:"]);
    assert!(config.ollama.retry_on_timeout);
    assert_eq!(config.session.history_capacity, 3);
    assert_eq!(config.web.port, 8080);
    assert_eq!(config.web.title.as_deref(), Some("Chat with Ali"));
}

#[test]
fn unknown_key_gets_suggestion() {
    let toml = r#"
[ollama]
modle = "mistral"
"#;

    let errors = load_and_validate_str(toml).expect_err("unknown key should fail");
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key,
            suggestion,
            valid_keys,
            ..
        } => {
            assert_eq!(key, "modle");
            assert_eq!(suggestion.as_deref(), Some("model"));
            assert!(valid_keys.contains("base_url"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

#[test]
fn unknown_section_is_rejected() {
    let errors = load_and_validate_str("[telegram]\nbot_token = \"x\"\n")
        .expect_err("unknown section should fail");
    assert!(matches!(
        &errors[0],
        ConfigError::UnknownKey { key, .. } if key == "telegram"
    ));
}

#[test]
fn wrong_type_is_reported() {
    let errors = load_and_validate_str("[web]\nport = \"eighty\"\n")
        .expect_err("string port should fail");
    assert!(matches!(
        &errors[0],
        ConfigError::InvalidType { key, .. } if key.contains("port")
    ));
}

#[test]
fn unknown_backend_is_reported() {
    let errors = load_and_validate_str("[embedding]\nbackend = \"openai\"\n")
        .expect_err("unknown backend should fail");
    assert!(matches!(&errors[0], ConfigError::InvalidValue { .. }));
}

#[test]
fn validation_runs_after_deserialization() {
    let errors = load_and_validate_str("[ollama]\ntemperature = 5.0\n")
        .expect_err("temperature out of range");
    assert!(errors.iter().any(
        |e| matches!(e, ConfigError::Validation { message } if message.contains("temperature"))
    ));
}

#[test]
fn explicit_path_must_exist() {
    let errors = load_and_validate_path(std::path::Path::new("/nonexistent/mimic.toml"))
        .expect_err("missing file should fail");
    assert!(matches!(&errors[0], ConfigError::Other(msg) if msg.contains("not found")));
}

#[test]
fn explicit_path_loads_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("custom.toml");
    std::fs::write(&path, "[persona]\nname = \"Hina\"\n").expect("write config");

    let config = load_and_validate_path(&path).expect("file should load");
    assert_eq!(config.persona.name, "Hina");
}

#[test]
fn default_config_round_trips_through_toml() {
    let rendered = toml::to_string(&MimicConfig::default()).expect("defaults should serialize");
    let config = load_and_validate_str(&rendered).expect("rendered defaults should load");
    assert_eq!(config.persona.name, "Saman");
}
