// SPDX-FileCopyrightText: 2026 Mimic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::MimicConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every violation instead of stopping at the first one.
pub fn validate_config(config: &MimicConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if !LOG_LEVELS.contains(&config.agent.log_level.as_str()) {
        fail(format!(
            "agent.log_level `{}` must be one of: {}",
            config.agent.log_level,
            LOG_LEVELS.join(", ")
        ));
    }

    if config.persona.name.trim().is_empty() {
        fail("persona.name must not be empty".to_string());
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    if config.embedding.model_name.trim().is_empty() {
        fail("embedding.model_name must not be empty".to_string());
    }
    if config.embedding.batch_size == 0 {
        fail("embedding.batch_size must be at least 1".to_string());
    }

    let ingest = &config.ingest;
    if ingest.min_phrase_frequency == 0 {
        fail("ingest.min_phrase_frequency must be at least 1".to_string());
    }
    if ingest.min_phrase_length == 0 {
        fail("ingest.min_phrase_length must be at least 1".to_string());
    }
    if ingest.max_phrase_length < ingest.min_phrase_length {
        fail(format!(
            "ingest.max_phrase_length ({}) must not be less than ingest.min_phrase_length ({})",
            ingest.max_phrase_length, ingest.min_phrase_length
        ));
    }

    let overlap = config.retrieval.direct_match_overlap;
    if !(0.0..=1.0).contains(&overlap) {
        fail(format!(
            "retrieval.direct_match_overlap must be between 0.0 and 1.0, got {overlap}"
        ));
    }

    if config.prompt.max_prompt_chars < 256 {
        fail(format!(
            "prompt.max_prompt_chars must be at least 256, got {}",
            config.prompt.max_prompt_chars
        ));
    }

    let ollama = &config.ollama;
    if !(ollama.base_url.starts_with("http://") || ollama.base_url.starts_with("https://")) {
        fail(format!(
            "ollama.base_url `{}` must start with http:// or https://",
            ollama.base_url
        ));
    }
    if ollama.model.trim().is_empty() {
        fail("ollama.model must not be empty".to_string());
    }
    if !(0.0..=2.0).contains(&ollama.temperature) {
        fail(format!(
            "ollama.temperature must be between 0.0 and 2.0, got {}",
            ollama.temperature
        ));
    }
    if ollama.max_tokens == 0 {
        fail("ollama.max_tokens must be at least 1".to_string());
    }
    if ollama.timeout_secs == 0 {
        fail("ollama.timeout_secs must be at least 1".to_string());
    }

    if config.session.max_sessions == 0 {
        fail("session.max_sessions must be at least 1".to_string());
    }

    let host = config.web.host.trim();
    let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
    let is_valid_hostname = !host.is_empty()
        && host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-');
    if !is_valid_ip && !is_valid_hostname {
        fail(format!(
            "web.host `{host}` is not a valid IP address or hostname"
        ));
    }
    if config.web.turn_timeout_secs == 0 {
        fail("web.turn_timeout_secs must be at least 1".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
