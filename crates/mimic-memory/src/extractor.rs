// SPDX-FileCopyrightText: 2026 Mimic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Frequent phrase mining over the persona's responses.
//!
//! Every contiguous token span between `min_length` and `max_length` tokens
//! is counted across the corpus. Spans that reach `min_frequency` become
//! [`PhraseCandidate`]s ordered by frequency, then alphabetically.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use mimic_config::model::IngestConfig;

/// A frequent span that has not been embedded yet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhraseCandidate {
    pub text: String,
    pub frequency: u32,
}

/// Thresholds for phrase mining.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseExtractor {
    pub min_frequency: u32,
    pub min_length: usize,
    pub max_length: usize,
    /// Keep only the top entries. `None` keeps everything.
    pub max_phrases: Option<usize>,
}

impl Default for PhraseExtractor {
    fn default() -> Self {
        Self {
            min_frequency: 5,
            min_length: 1,
            max_length: 5,
            max_phrases: Some(30),
        }
    }
}

impl PhraseExtractor {
    pub fn from_config(config: &IngestConfig) -> Self {
        Self {
            min_frequency: config.min_phrase_frequency,
            min_length: config.min_phrase_length,
            max_length: config.max_phrase_length,
            max_phrases: Some(config.max_phrases),
        }
    }

    pub fn extract<S: AsRef<str>>(&self, corpus: &[S]) -> Vec<PhraseCandidate> {
        let min_length = self.min_length.max(1);
        if self.max_length < min_length {
            return Vec::new();
        }

        let mut counts: HashMap<String, u32> = HashMap::new();
        for text in corpus {
            let tokens = tokenize(text.as_ref());
            for len in min_length..=self.max_length.min(tokens.len()) {
                for window in tokens.windows(len) {
                    *counts.entry(window.join(" ")).or_insert(0) += 1;
                }
            }
        }

        let mut phrases: Vec<PhraseCandidate> = counts
            .into_iter()
            .filter(|(_, count)| *count >= self.min_frequency)
            .map(|(text, frequency)| PhraseCandidate { text, frequency })
            .collect();
        phrases.sort_by(|a, b| b.frequency.cmp(&a.frequency).then_with(|| a.text.cmp(&b.text)));
        if let Some(max) = self.max_phrases {
            phrases.truncate(max);
        }
        phrases
    }
}

/// `extract` with the default minimum span length and no output cap.
pub fn extract<S: AsRef<str>>(
    corpus: &[S],
    min_frequency: u32,
    max_length: usize,
) -> Vec<PhraseCandidate> {
    PhraseExtractor {
        min_frequency,
        max_length,
        max_phrases: None,
        ..PhraseExtractor::default()
    }
    .extract(corpus)
}

/// Lowercases, splits on whitespace and trims ASCII punctuation from each token.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(|t| t.trim_matches(|c: char| c.is_ascii_punctuation()))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
