// SPDX-FileCopyrightText: 2026 Mimic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Web front end for Mimic.
//!
//! Serves a browser chat widget and a JSON chat endpoint backed by the
//! shared reply pipeline, with one conversation session per browser tab.

pub mod handlers;
pub mod server;
pub mod widget;

pub use handlers::{ChatRequest, ChatResponse, MAX_MESSAGE_CHARS};
pub use server::{build_router, start_server, GatewayState, ServerConfig};
pub use widget::{escape_html, WidgetPage};
