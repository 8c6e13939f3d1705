// SPDX-FileCopyrightText: 2026 Mimic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation handling for Mimic.
//!
//! Owns conversation sessions, the registry that keeps web sessions apart,
//! and the reply pipeline that turns a user message into a persona reply.

pub mod direct_match;
pub mod pipeline;
pub mod registry;
pub mod session;
pub mod shutdown;

pub use direct_match::{choose_direct_reply, find_direct_matches};
pub use pipeline::{PipelineSettings, ReplyKind, ReplyPipeline, TurnReply};
pub use registry::{SessionRegistry, SharedSession};
pub use session::ConversationSession;
pub use shutdown::install_signal_handler;
