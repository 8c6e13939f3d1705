// SPDX-FileCopyrightText: 2026 Mimic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mimic - a chatbot that replies in the texting style of a real person.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod clean;
mod doctor;
mod ingest;
mod runtime;
mod serve;
mod shell;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;

/// Mimic - replies to your messages the way a real person would.
#[derive(Parser, Debug)]
#[command(name = "mimic", version, about, long_about = None)]
struct Cli {
    /// Configuration file to load instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Embed a conversation file into the example store.
    Ingest {
        /// JSON conversation records (defaults to `ingest.conversation_file`).
        #[arg(long)]
        file: Option<PathBuf>,
        /// Discard the existing store before ingesting.
        #[arg(long)]
        rebuild: bool,
    },
    /// Convert a WhatsApp chat export into conversation records.
    Clean {
        /// The exported `.txt` chat.
        export: PathBuf,
        /// Sender whose messages to keep (defaults to `persona.name`).
        #[arg(long)]
        person: Option<String>,
        /// Output JSON file (defaults to `ingest.conversation_file`).
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Chat in the terminal.
    Shell,
    /// Serve the browser chat widget.
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Check configuration, store and model server.
    Doctor {
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => mimic_config::load_and_validate_path(path),
        None => mimic_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            mimic_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.agent.log_level);

    let result = match cli.command {
        Commands::Ingest { file, rebuild } => ingest::run_ingest(&config, file, rebuild).await,
        Commands::Clean {
            export,
            person,
            output,
        } => clean::run_clean(&config, &export, person, output).await,
        Commands::Shell => shell::run_shell(&config).await,
        Commands::Serve { host, port } => serve::run_serve(&config, host, port).await,
        Commands::Doctor { plain } => doctor::run_doctor(&config, plain).await,
    };

    if let Err(e) = result {
        eprintln!("{}: {e}", "error".red());
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber with the given log level.
///
/// Logs go to stderr so they never mix into console replies.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("mimic={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Only jemalloc supports advancing the stats epoch.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn clean_takes_export_and_options() {
        let cli = Cli::try_parse_from([
            "mimic", "clean", "chat.txt", "--person", "Saman", "-o", "out.json",
        ])
        .unwrap();
        match cli.command {
            Commands::Clean {
                export,
                person,
                output,
            } => {
                assert_eq!(export, PathBuf::from("chat.txt"));
                assert_eq!(person.as_deref(), Some("Saman"));
                assert_eq!(output, Some(PathBuf::from("out.json")));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::try_parse_from(["mimic", "serve", "--port", "9000", "--config", "m.toml"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("m.toml")));
        assert!(matches!(cli.command, Commands::Serve { port: Some(9000), .. }));
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config = mimic_config::load_and_validate_str("").expect("default config should be valid");
        assert_eq!(config.persona.name, "Saman");
    }
}
