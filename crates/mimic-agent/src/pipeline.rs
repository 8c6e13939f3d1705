// SPDX-FileCopyrightText: 2026 Mimic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The per-turn reply pipeline shared by the console and the web server.
//!
//! A turn goes through direct matching, retrieval, prompt assembly and
//! generation. Retrieval problems degrade to an unenriched prompt and
//! generation problems to the configured fallback reply, so a turn always
//! produces something to show.

use std::sync::Arc;

use futures::StreamExt;
use mimic_config::model::MimicConfig;
use mimic_context::{Persona, PromptAssembler};
use mimic_core::traits::GenerationAdapter;
use mimic_core::types::{Example, GenerationOptions, Phrase};
use mimic_core::MimicError;
use mimic_memory::ExampleStore;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::direct_match::choose_direct_reply;
use crate::session::ConversationSession;

/// How the reply to a turn was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReplyKind {
    /// Written by the language model.
    Generated,
    /// A stored response whose context matched the message.
    DirectMatch,
    /// The configured fallback after generation failed.
    Fallback,
}

/// The outcome of one turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnReply {
    pub text: String,
    pub kind: ReplyKind,
}

/// Tunables for a [`ReplyPipeline`].
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub examples_per_prompt: usize,
    pub phrases_per_prompt: usize,
    pub direct_match: bool,
    pub direct_match_overlap: f64,
    pub fallback_reply: String,
}

impl PipelineSettings {
    pub fn from_config(config: &MimicConfig) -> Self {
        Self {
            examples_per_prompt: config.retrieval.examples_per_prompt,
            phrases_per_prompt: config.retrieval.phrases_per_prompt,
            direct_match: config.retrieval.direct_match,
            direct_match_overlap: config.retrieval.direct_match_overlap,
            fallback_reply: config.persona.fallback_reply.clone(),
        }
    }
}

/// Produces persona replies from a read-only example store and a generator.
pub struct ReplyPipeline {
    store: Arc<ExampleStore>,
    generator: Arc<dyn GenerationAdapter>,
    assembler: PromptAssembler,
    persona: Persona,
    options: GenerationOptions,
    settings: PipelineSettings,
}

impl ReplyPipeline {
    pub fn new(
        store: Arc<ExampleStore>,
        generator: Arc<dyn GenerationAdapter>,
        assembler: PromptAssembler,
        persona: Persona,
        options: GenerationOptions,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            store,
            generator,
            assembler,
            persona,
            options,
            settings,
        }
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    pub fn store(&self) -> &ExampleStore {
        &self.store
    }

    pub fn fallback_reply(&self) -> &str {
        &self.settings.fallback_reply
    }

    /// Runs one turn and records it in `session` unless it fell back.
    pub async fn process_turn(
        &self,
        session: &mut ConversationSession,
        message: &str,
    ) -> TurnReply {
        let message = message.trim();
        if let Some(reply) = self.direct_reply(message) {
            session.record(message, reply.clone());
            return TurnReply {
                text: reply,
                kind: ReplyKind::DirectMatch,
            };
        }

        let Some(prompt) = self.build_prompt(session, message).await else {
            return self.fallback();
        };

        match self.generator.generate(&prompt, &self.options).await {
            Ok(text) => self.finish_generated(session, message, text),
            Err(e) => {
                warn!(error = %e, "generation failed, using fallback reply");
                self.fallback()
            }
        }
    }

    /// Like [`process_turn`](Self::process_turn) but hands generated
    /// fragments to `on_chunk` as they arrive.
    ///
    /// Direct-match and fallback text is returned without going through
    /// `on_chunk`. A stream that breaks partway ends in a fallback.
    pub async fn stream_turn<F>(
        &self,
        session: &mut ConversationSession,
        message: &str,
        mut on_chunk: F,
    ) -> TurnReply
    where
        F: FnMut(&str) + Send,
    {
        let message = message.trim();
        if let Some(reply) = self.direct_reply(message) {
            session.record(message, reply.clone());
            return TurnReply {
                text: reply,
                kind: ReplyKind::DirectMatch,
            };
        }

        let Some(prompt) = self.build_prompt(session, message).await else {
            return self.fallback();
        };

        let mut stream = match self.generator.generate_stream(&prompt, &self.options).await {
            Ok(stream) => stream,
            Err(e) => {
                warn!(error = %e, "generation failed, using fallback reply");
                return self.fallback();
            }
        };

        let mut text = String::new();
        while let Some(fragment) = stream.next().await {
            match fragment {
                Ok(fragment) => {
                    on_chunk(&fragment);
                    text.push_str(&fragment);
                }
                Err(e) => {
                    warn!(error = %e, received = text.len(), "reply stream broke, using fallback reply");
                    return self.fallback();
                }
            }
        }
        self.finish_generated(session, message, text)
    }

    fn direct_reply(&self, message: &str) -> Option<String> {
        if !self.settings.direct_match {
            return None;
        }
        let reply = choose_direct_reply(
            message,
            self.store.examples(),
            self.settings.direct_match_overlap,
        )?;
        debug!("direct match found");
        Some(reply)
    }

    /// Nearest examples and phrases; any retrieval failure yields nothing.
    async fn retrieve(&self, message: &str) -> (Vec<Example>, Vec<Phrase>) {
        let want_examples = self.settings.examples_per_prompt > 0 && self.store.example_count() > 0;
        let want_phrases = self.settings.phrases_per_prompt > 0 && self.store.phrase_count() > 0;
        if !want_examples && !want_phrases {
            debug!("nothing to retrieve");
            return (Vec::new(), Vec::new());
        }

        let vector = match self.store.embed_query(message).await {
            Ok(vector) => vector,
            Err(e) => {
                warn!(error = %e, "query embedding failed, continuing without examples");
                return (Vec::new(), Vec::new());
            }
        };

        let examples = if want_examples {
            self.store
                .nearest_examples(&vector, self.settings.examples_per_prompt)
                .map(|hits| hits.into_iter().map(|hit| hit.item).collect())
                .unwrap_or_else(|e| retrieval_failed(&e, "examples"))
        } else {
            Vec::new()
        };
        let phrases = if want_phrases {
            self.store
                .nearest_phrases(&vector, self.settings.phrases_per_prompt)
                .map(|hits| hits.into_iter().map(|hit| hit.item).collect())
                .unwrap_or_else(|e| retrieval_failed(&e, "phrases"))
        } else {
            Vec::new()
        };

        debug!(examples = examples.len(), phrases = phrases.len(), "retrieved context");
        (examples, phrases)
    }

    /// The assembler has already dropped every turn, example and phrase
    /// before it fails, so a failure here goes straight to the fallback.
    async fn build_prompt(&self, session: &ConversationSession, message: &str) -> Option<String> {
        let (examples, phrases) = self.retrieve(message).await;
        self.assembler
            .assemble(
                message,
                &examples,
                &phrases,
                &session.history(),
                &self.persona,
            )
            .inspect_err(|e| warn!(error = %e, "prompt assembly failed, using fallback reply"))
            .ok()
    }

    fn finish_generated(
        &self,
        session: &mut ConversationSession,
        message: &str,
        text: String,
    ) -> TurnReply {
        let text = text.trim().to_string();
        if text.is_empty() {
            warn!("model returned an empty reply, using fallback reply");
            return self.fallback();
        }
        session.record(message, text.clone());
        info!(chars = text.chars().count(), "reply generated");
        TurnReply {
            text,
            kind: ReplyKind::Generated,
        }
    }

    fn fallback(&self) -> TurnReply {
        TurnReply {
            text: self.settings.fallback_reply.clone(),
            kind: ReplyKind::Fallback,
        }
    }
}

fn retrieval_failed<T>(error: &MimicError, what: &str) -> Vec<T> {
    warn!(error = %error, what, "retrieval failed, continuing without it");
    Vec::new()
}
