// SPDX-FileCopyrightText: 2026 Mimic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `mimic clean` command implementation.

use std::path::{Path, PathBuf};

use mimic_config::model::MimicConfig;
use mimic_core::MimicError;
use mimic_memory::whatsapp::{parse_export_file, write_records};

/// Converts a WhatsApp export into the JSON ingestion format.
pub async fn run_clean(
    config: &MimicConfig,
    export: &Path,
    person: Option<String>,
    output: Option<PathBuf>,
) -> Result<(), MimicError> {
    let person = person.unwrap_or_else(|| config.persona.name.clone());
    let output = output.unwrap_or_else(|| PathBuf::from(&config.ingest.conversation_file));

    let parsed = parse_export_file(export, &person).await?;
    if parsed.records.is_empty() {
        return Err(MimicError::Config(format!(
            "no messages from '{person}' among {} messages in {}",
            parsed.messages,
            export.display()
        )));
    }

    write_records(&output, &parsed.records).await?;
    let replies = parsed
        .records
        .iter()
        .filter(|r| !r.context.is_empty())
        .count();
    println!(
        "wrote {} records ({replies} replies, {} standalone) to {}",
        parsed.records.len(),
        parsed.records.len() - replies,
        output.display()
    );
    Ok(())
}
