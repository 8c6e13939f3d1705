// SPDX-FileCopyrightText: 2026 Mimic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base adapter trait shared by embedders and generators.

use async_trait::async_trait;

use crate::error::MimicError;
use crate::types::HealthStatus;

/// Health reporting for every pluggable backend.
#[async_trait]
pub trait PluginAdapter: Send + Sync + 'static {
    /// Performs a health check and returns the adapter's current status.
    async fn health_check(&self) -> Result<HealthStatus, MimicError>;
}
