// SPDX-FileCopyrightText: 2026 Codevault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! codevault - password-escrowed master key for backup recovery codes.
//!
//! This is the binary entry point. It wires configuration, logging, and
//! password prompts to the key-management library; account bookkeeping and
//! code catalogs live elsewhere.

mod commands;
mod status;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use codevault_config::CodevaultConfig;

/// codevault - password-escrowed master key for backup recovery codes.
#[derive(Parser, Debug)]
#[command(name = "codevault", version, about, long_about = None)]
struct Cli {
    /// Explicit config file (skips the XDG lookup).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate the master key and enroll three passwords.
    Init,
    /// Check that a password unlocks the vault.
    Unlock,
    /// Replace all three passwords, keeping the master key.
    Rotate,
    /// Seal stdin under the master key and print the token.
    Seal,
    /// Open a token and write the plaintext to stdout.
    Open {
        /// Token printed by `codevault seal`.
        token: String,
    },
    /// Print a fresh random salt for `vault.salt`.
    Salt,
    /// Show whether the vault is initialized and which shares exist.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Salt generation is how a config gets its salt, so it cannot require one.
    if let Commands::Salt = cli.command {
        return report(commands::run_salt());
    }

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            codevault_config::render_errors(&errors);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config.logging.level);
    tracing::debug!(directory = %config.vault.directory.display(), "configuration loaded");

    let result = match cli.command {
        Commands::Init => commands::run_init(&config),
        Commands::Unlock => commands::run_unlock(&config),
        Commands::Rotate => commands::run_rotate(&config),
        Commands::Seal => commands::run_seal(&config),
        Commands::Open { token } => commands::run_open(&config, &token),
        Commands::Status { json } => status::run_status(&config, json),
        Commands::Salt => commands::run_salt(),
    };
    report(result)
}

fn load_config(
    path: Option<&std::path::Path>,
) -> Result<CodevaultConfig, Vec<codevault_config::ConfigError>> {
    match path {
        Some(path) => codevault_config::load_and_validate_path(path),
        None => codevault_config::load_and_validate(),
    }
}

fn report(result: Result<(), codevault_core::VaultError>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the tracing subscriber with the given log level.
///
/// `RUST_LOG` takes precedence over the configured level. Logs go to stderr
/// so stdout stays clean for tokens and plaintext.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("codevault={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
