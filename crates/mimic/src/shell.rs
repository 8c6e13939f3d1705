// SPDX-FileCopyrightText: 2026 Mimic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `mimic shell` command implementation.
//!
//! A console chat with colored prompts, readline history and, when
//! `ollama.stream` is set, replies printed as they are generated.

use std::io::Write;

use colored::Colorize;
use mimic_agent::{ConversationSession, ReplyKind};
use mimic_config::model::MimicConfig;
use mimic_core::MimicError;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::runtime;

const EXIT_WORDS: &[&str] = &["exit", "quit", "bye", "/exit", "/quit"];

/// True for input that ends the console session.
pub fn is_exit_command(line: &str) -> bool {
    let line = line.trim();
    line.is_empty() || EXIT_WORDS.iter().any(|w| line.eq_ignore_ascii_case(w))
}

pub async fn run_shell(config: &MimicConfig) -> Result<(), MimicError> {
    let pipeline = runtime::prepare_pipeline(config).await?;
    let name = pipeline.persona().name.clone();
    let mut session = ConversationSession::new("console", config.session.history_capacity);

    let mut rl = DefaultEditor::new()
        .map_err(|e| MimicError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", format!("Chat with {name}").bold().green());
    println!("Type {} or press Enter on an empty line to leave.\n", "exit".yellow());

    let prompt = format!("{}: ", "You".cyan());
    loop {
        let line = match rl.readline(&prompt) {
            Ok(line) => line,
            // Ctrl+C / Ctrl+D
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        };
        if is_exit_command(&line) {
            break;
        }
        let _ = rl.add_history_entry(line.as_str());

        print!("{}: ", name.green());
        let _ = std::io::stdout().flush();

        if config.ollama.stream {
            let mut streamed = false;
            let reply = pipeline
                .stream_turn(&mut session, &line, |chunk| {
                    streamed = true;
                    print!("{chunk}");
                    let _ = std::io::stdout().flush();
                })
                .await;
            match reply.kind {
                ReplyKind::Generated => println!(),
                _ if streamed => println!("\n{}", reply.text.dimmed()),
                _ => print_reply(reply.kind, &reply.text),
            }
        } else {
            let reply = pipeline.process_turn(&mut session, &line).await;
            print_reply(reply.kind, &reply.text);
        }
    }

    println!("{}: {}", name.green(), config.persona.farewell);
    Ok(())
}

fn print_reply(kind: ReplyKind, text: &str) {
    match kind {
        ReplyKind::Fallback => println!("{}", text.dimmed()),
        _ => println!("{text}"),
    }
}
