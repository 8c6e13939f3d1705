// SPDX-FileCopyrightText: 2026 Mimic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for Mimic.
//!
//! Opens the database with WAL mode and embedded migrations, and hands out a
//! single-writer `tokio-rusqlite` connection that the example store builds on.

pub mod database;
pub mod migrations;

pub use database::{map_tr_err, Database};
