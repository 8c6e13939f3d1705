// SPDX-FileCopyrightText: 2026 Mimic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `mimic serve` command implementation.

use std::sync::Arc;
use std::time::Duration;

use mimic_agent::{install_signal_handler, SessionRegistry};
use mimic_config::model::MimicConfig;
use mimic_core::MimicError;
use mimic_gateway::{start_server, GatewayState, ServerConfig, WidgetPage};
use tracing::info;

use crate::runtime;

/// Serves the chat widget until SIGINT or SIGTERM.
pub async fn run_serve(
    config: &MimicConfig,
    host: Option<String>,
    port: Option<u16>,
) -> Result<(), MimicError> {
    let pipeline = Arc::new(runtime::prepare_pipeline(config).await?);
    let sessions = Arc::new(SessionRegistry::new(
        config.session.history_capacity,
        config.session.max_sessions,
    ));
    let page = WidgetPage::from_config(&config.web, &pipeline.persona().name);
    let state = GatewayState::new(
        pipeline,
        sessions,
        &page,
        Duration::from_secs(config.web.turn_timeout_secs),
    );

    let server = ServerConfig {
        host: host.unwrap_or_else(|| config.web.host.clone()),
        port: port.unwrap_or(config.web.port),
    };
    info!(title = %page.title, "starting web front end");

    let shutdown = install_signal_handler();
    start_server(&server, state, shutdown).await
}
