// SPDX-FileCopyrightText: 2026 Mimic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt assembly under a character budget.
//!
//! Layout, with empty sections left out:
//!
//! ```text
//! <persona description>
//!
//! Messages <name> has sent in similar contexts:
//! Message: ...
//! <name>: ...
//!
//! Phrases <name> often uses:
//! - "..." (used N times)
//!
//! Recent conversation:
//! You: ...
//! <name>: ...
//!
//! Now reply to this message as <name> would:
//! You: <message>
//! <name>:
//! ```
//!
//! An over-budget prompt sheds the oldest history turn first, then the
//! last example, then the last phrase.

use std::fmt::Write;

use mimic_config::model::PromptConfig;
use mimic_core::types::{Example, Phrase, Turn};
use mimic_core::MimicError;
use tracing::debug;

use crate::persona::Persona;

/// Builds generation prompts no longer than `max_chars` Unicode scalars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptAssembler {
    max_chars: usize,
}

impl PromptAssembler {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    pub fn from_config(config: &PromptConfig) -> Self {
        Self::new(config.max_prompt_chars)
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Renders the prompt, truncating until it fits.
    ///
    /// `examples` and `phrases` are expected most relevant first and
    /// `recent_turns` oldest first. Content is never reordered.
    pub fn assemble(
        &self,
        user_message: &str,
        examples: &[Example],
        phrases: &[Phrase],
        recent_turns: &[Turn],
        persona: &Persona,
    ) -> Result<String, MimicError> {
        let mut first_turn = 0;
        let mut example_count = examples.len();
        let mut phrase_count = phrases.len();

        loop {
            let prompt = render(
                user_message,
                &examples[..example_count],
                &phrases[..phrase_count],
                &recent_turns[first_turn..],
                persona,
            );
            let length = prompt.chars().count();
            if length <= self.max_chars {
                if first_turn > 0 || example_count < examples.len() || phrase_count < phrases.len() {
                    debug!(
                        dropped_turns = first_turn,
                        dropped_examples = examples.len() - example_count,
                        dropped_phrases = phrases.len() - phrase_count,
                        length,
                        "prompt truncated to fit budget"
                    );
                }
                return Ok(prompt);
            }

            if first_turn < recent_turns.len() {
                first_turn += 1;
            } else if example_count > 0 {
                example_count -= 1;
            } else if phrase_count > 0 {
                phrase_count -= 1;
            } else {
                return Err(MimicError::PromptTooLong {
                    length,
                    max: self.max_chars,
                });
            }
        }
    }
}

fn render(
    user_message: &str,
    examples: &[Example],
    phrases: &[Phrase],
    turns: &[Turn],
    persona: &Persona,
) -> String {
    let name = &persona.name;
    let mut sections: Vec<String> = Vec::with_capacity(5);

    if !persona.description.is_empty() {
        sections.push(persona.description.clone());
    }

    if !examples.is_empty() {
        let mut s = format!("Messages {name} has sent in similar contexts:");
        for example in examples {
            let _ = write!(s, "\nMessage: {}\n{name}: {}", example.source_message, example.response);
        }
        sections.push(s);
    }

    if !phrases.is_empty() {
        let mut s = format!("Phrases {name} often uses:");
        for phrase in phrases {
            let _ = write!(s, "\n- \"{}\" (used {} times)", phrase.text, phrase.frequency);
        }
        sections.push(s);
    }

    if !turns.is_empty() {
        let mut s = String::from("Recent conversation:");
        for turn in turns {
            let _ = write!(s, "\nYou: {}\n{name}: {}", turn.message, turn.reply);
        }
        sections.push(s);
    }

    sections.push(format!(
        "Now reply to this message as {name} would:\nYou: {user_message}\n{name}:"
    ));

    sections.join("\n\n")
}
