// SPDX-FileCopyrightText: 2026 Mimic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup order: `./mimic.toml` > `~/.config/mimic/mimic.toml` > `/etc/mimic/mimic.toml`,
//! with environment variable overrides via the `MIMIC_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::MimicConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/mimic/mimic.toml";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "mimic.toml";

/// Section names, used to map `MIMIC_SECTION_KEY` env vars to `section.key`.
const SECTIONS: &[&str] = &[
    "agent",
    "persona",
    "storage",
    "embedding",
    "ingest",
    "retrieval",
    "prompt",
    "ollama",
    "session",
    "web",
];

/// Path of the per-user config file, if a config directory exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("mimic").join(LOCAL_CONFIG_FILE))
}

/// Build the Figment for the standard hierarchy.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/mimic/mimic.toml`
/// 3. `~/.config/mimic/mimic.toml`
/// 4. `./mimic.toml`
/// 5. `MIMIC_*` environment variables
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(MimicConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Load configuration from the standard hierarchy with env var overrides.
pub fn load_config() -> Result<MimicConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string on top of the defaults.
///
/// No files or environment variables are consulted.
pub fn load_config_from_str(toml_content: &str) -> Result<MimicConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MimicConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from an explicit file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<MimicConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MimicConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Maps `MIMIC_OLLAMA_BASE_URL` to `ollama.base_url`.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names
/// contain underscores themselves.
fn env_provider() -> Env {
    Env::prefixed("MIMIC_").map(|key| map_env_key(key.as_str()).into())
}

/// Rewrites the first `section_` prefix of a lowercased env key into `section.`.
pub(crate) fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
            && !rest.is_empty()
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_sections() {
        assert_eq!(map_env_key("ollama_base_url"), "ollama.base_url");
        assert_eq!(map_env_key("web_port"), "web.port");
        assert_eq!(
            map_env_key("ingest_min_phrase_frequency"),
            "ingest.min_phrase_frequency"
        );
        assert_eq!(
            map_env_key("storage_database_path"),
            "storage.database_path"
        );
    }

    #[test]
    fn only_first_section_prefix_is_rewritten() {
        assert_eq!(
            map_env_key("persona_description_file"),
            "persona.description_file"
        );
        assert_eq!(map_env_key("prompt_max_prompt_chars"), "prompt.max_prompt_chars");
    }

    #[test]
    fn unknown_prefix_is_left_alone() {
        assert_eq!(map_env_key("unrelated"), "unrelated");
        assert_eq!(map_env_key("ollama_"), "ollama_");
    }

    #[test]
    fn env_overrides_file_values() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "custom.toml",
                r#"
[ollama]
model = "mistral"
timeout_secs = 30
"#,
            )?;
            jail.set_env("MIMIC_OLLAMA_TIMEOUT_SECS", "45");
            jail.set_env("MIMIC_PERSONA_NAME", "Ali");

            let config = load_config_from_path(Path::new("custom.toml"))
                .expect("config should load");
            assert_eq!(config.ollama.model, "mistral");
            assert_eq!(config.ollama.timeout_secs, 45);
            assert_eq!(config.persona.name, "Ali");
            Ok(())
        });
    }

    #[test]
    fn local_file_is_picked_up_by_hierarchy() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                LOCAL_CONFIG_FILE,
                r#"
[web]
port = 9000
"#,
            )?;
            let config = load_config().expect("config should load");
            assert_eq!(config.web.port, 9000);
            Ok(())
        });
    }
}
