// SPDX-FileCopyrightText: 2026 Mimic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persona: the display name and the style description at the top of every prompt.

use mimic_config::model::PersonaConfig;
use tracing::{info, warn};

/// Who the model is imitating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persona {
    pub name: String,
    /// Style instructions. `{name}` has already been substituted.
    pub description: String,
}

impl Persona {
    /// A persona with the built-in description.
    pub fn with_default_description(name: impl Into<String>) -> Self {
        let name = name.into();
        let description = default_description(&name);
        Self { name, description }
    }

    /// Loads the description with priority: file > inline > built-in default.
    ///
    /// An unreadable or empty file is logged and skipped.
    pub async fn load(config: &PersonaConfig) -> Self {
        let name = config.name.clone();

        if let Some(ref file_path) = config.description_file {
            match tokio::fs::read_to_string(file_path).await {
                Ok(content) => {
                    let trimmed = content.trim();
                    if !trimmed.is_empty() {
                        info!(path = file_path.as_str(), "loaded persona from file");
                        return Self {
                            description: trimmed.replace("{name}", &name),
                            name,
                        };
                    }
                }
                Err(e) => {
                    warn!(
                        path = file_path.as_str(),
                        error = %e,
                        "failed to read persona file, falling back"
                    );
                }
            }
        }

        if let Some(ref description) = config.description
            && !description.trim().is_empty()
        {
            return Self {
                description: description.trim().replace("{name}", &name),
                name,
            };
        }

        Self::with_default_description(name)
    }
}

fn default_description(name: &str) -> String {
    format!(
        "You are {name}, replying to a friend on WhatsApp. Write exactly the way {name} texts.\n\
         \n\
         Guidelines:\n\
         1. Copy {name}'s texting style, slang, abbreviations and emoji habits.\n\
         2. Keep replies as short as {name}'s usually are.\n\
         3. Write Roman Urdu with {name}'s own spellings.\n\
         4. Use emojis only where {name} would.\n\
         5. Match {name}'s level of informality.\n\
         Reply with the message text only."
    )
}
