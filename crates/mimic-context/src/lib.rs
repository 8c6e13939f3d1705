// SPDX-FileCopyrightText: 2026 Mimic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt construction for Mimic.
//!
//! [`Persona`] supplies the style description and display name.
//! [`PromptAssembler`] lays out the retrieved examples, frequent phrases and
//! recent history around the new message, within a character budget.

pub mod assembler;
pub mod persona;

pub use assembler::PromptAssembler;
pub use persona::Persona;
