// SPDX-FileCopyrightText: 2026 Mimic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Verbatim replies for messages that closely match a stored context.

use std::collections::HashSet;

use mimic_core::types::Example;
use rand::seq::SliceRandom;

/// Responses whose stored source message closely matches `message`.
///
/// A stored context qualifies when, compared case-insensitively, one text
/// contains the other and the shared distinct words exceed `min_overlap`
/// of the longer text's word count. Examples without a context never match.
pub fn find_direct_matches<'a>(
    message: &str,
    examples: &'a [Example],
    min_overlap: f64,
) -> Vec<&'a Example> {
    let message = message.trim().to_lowercase();
    if message.is_empty() {
        return Vec::new();
    }
    let message_words: Vec<&str> = message.split_whitespace().collect();
    let message_set: HashSet<&str> = message_words.iter().copied().collect();

    examples
        .iter()
        .filter(|example| {
            let context = example.source_message.trim().to_lowercase();
            if context.is_empty() {
                return false;
            }
            if !context.contains(&message) && !message.contains(&context) {
                return false;
            }
            let context_words: Vec<&str> = context.split_whitespace().collect();
            let shared = context_words
                .iter()
                .collect::<HashSet<_>>()
                .into_iter()
                .filter(|w| message_set.contains(**w))
                .count();
            let longest = message_words.len().max(context_words.len());
            longest > 0 && (shared as f64 / longest as f64) > min_overlap
        })
        .collect()
}

/// Picks one matching response at random.
pub fn choose_direct_reply(message: &str, examples: &[Example], min_overlap: f64) -> Option<String> {
    let matches = find_direct_matches(message, examples, min_overlap);
    matches
        .choose(&mut rand::thread_rng())
        .map(|example| example.response.clone())
}
