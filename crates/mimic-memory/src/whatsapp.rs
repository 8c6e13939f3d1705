// SPDX-FileCopyrightText: 2026 Mimic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WhatsApp text export cleaner.
//!
//! Export lines look like `12/03/2024, 9:41 pm - Saman: kya haal hai`.
//! Lines without the ` - ` and `: ` separators are continuations or system
//! notices and are skipped.

use std::path::Path;

use tracing::debug;

use mimic_core::MimicError;

use crate::ingest::ConversationRecord;

const MEDIA_PLACEHOLDER: &str = "<Media omitted>";

/// Result of parsing an export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedExport {
    pub records: Vec<ConversationRecord>,
    /// Chat messages seen, from anyone.
    pub messages: usize,
}

/// Extracts `person`'s messages from an export.
///
/// A message from `person` directly after someone else's message becomes a
/// reply with that message as context. Any other message from `person` is
/// standalone. Senders match when their display name contains `person`.
pub fn parse_export(text: &str, person: &str) -> ParsedExport {
    let mut parsed = ParsedExport::default();
    let mut last: Option<(&str, &str)> = None;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some((timestamp, rest)) = line.split_once(" - ") else {
            continue;
        };
        let Some((sender, message)) = rest.split_once(": ") else {
            continue;
        };
        parsed.messages += 1;

        if message.contains(MEDIA_PLACEHOLDER) {
            continue;
        }

        if sender.contains(person) {
            let context = match last {
                Some((previous, previous_sender))
                    if !previous.is_empty() && !previous_sender.contains(person) =>
                {
                    previous
                }
                _ => "",
            };
            parsed.records.push(ConversationRecord {
                context: context.to_string(),
                response: message.to_string(),
                timestamp: Some(timestamp.to_string()),
            });
        }
        last = Some((message, sender));
    }

    debug!(
        messages = parsed.messages,
        records = parsed.records.len(),
        "parsed WhatsApp export"
    );
    parsed
}

/// Reads an export from disk.
pub async fn parse_export_file(path: &Path, person: &str) -> Result<ParsedExport, MimicError> {
    let text = tokio::fs::read_to_string(path).await.map_err(|e| {
        MimicError::Config(format!("cannot read export {}: {e}", path.display()))
    })?;
    Ok(parse_export(&text, person))
}

/// Writes records as pretty-printed JSON, keeping non-ASCII text as is.
pub async fn write_records(path: &Path, records: &[ConversationRecord]) -> Result<(), MimicError> {
    let json = serde_json::to_string_pretty(records)
        .map_err(|e| MimicError::Internal(format!("failed to serialize records: {e}")))?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| MimicError::Internal(format!("failed to create {}: {e}", parent.display())))?;
    }
    tokio::fs::write(path, json)
        .await
        .map_err(|e| MimicError::Internal(format!("failed to write {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT: &str = "\
12/03/2024, 9:40 pm - Messages and calls are end-to-end encrypted.
12/03/2024, 9:41 pm - Ali: Aslam alikum
12/03/2024, 9:41 pm - Saman Khan: walaikum salam!
12/03/2024, 9:42 pm - Saman Khan: kya haal hai
12/03/2024, 9:43 pm - Ali: <Media omitted>
12/03/2024, 9:44 pm - Ali: theek, tum sunao
this line continues the previous message
12/03/2024, 9:45 pm - Saman Khan: bas yr 😄
";

    #[test]
    fn pairs_replies_with_previous_message() {
        let parsed = parse_export(EXPORT, "Saman");
        let got: Vec<(&str, &str)> = parsed
            .records
            .iter()
            .map(|r| (r.context.as_str(), r.response.as_str()))
            .collect();
        assert_eq!(
            got,
            vec![
                ("Aslam alikum", "walaikum salam!"),
                ("", "kya haal hai"),
                ("theek, tum sunao", "bas yr 😄"),
            ]
        );
        assert_eq!(parsed.records[0].timestamp.as_deref(), Some("12/03/2024, 9:41 pm"));
    }

    #[test]
    fn counts_messages_including_media() {
        let parsed = parse_export(EXPORT, "Saman");
        assert_eq!(parsed.messages, 6);
    }

    #[test]
    fn persona_media_is_dropped() {
        let text = "1/1/24, 9:00 am - Ali: hi\n1/1/24, 9:01 am - Saman: <Media omitted>\n";
        assert!(parse_export(text, "Saman").records.is_empty());
    }

    #[test]
    fn unknown_person_yields_nothing() {
        assert!(parse_export(EXPORT, "Zara").records.is_empty());
    }

    #[tokio::test]
    async fn written_json_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("saman.json");
        let parsed = parse_export(EXPORT, "Saman");
        write_records(&path, &parsed.records).await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("😄"));
        let back = crate::ingest::load_records(&path).await.unwrap();
        assert_eq!(back, parsed.records);
    }
}
