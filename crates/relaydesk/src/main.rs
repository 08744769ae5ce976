// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Relaydesk, an anonymous support-ticketing relay bot.
//!
//! This is the binary entry point.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod serve;
mod staff;
mod status;

/// Relaydesk, an anonymous support-ticketing relay bot.
#[derive(Parser, Debug)]
#[command(name = "relaydesk", version, about, long_about = None)]
struct Cli {
    /// Path to a config file, bypassing the XDG lookup.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the relay bot.
    Serve,
    /// Show database status.
    Status,
    /// Grant the staff role to a user.
    AddStaff {
        /// Platform user id, e.g. `@alice:example.org`.
        user_id: String,
    },
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => relaydesk_config::load_and_validate_path(path),
        None => relaydesk_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            relaydesk_config::render_errors(&errors);
            std::process::exit(1);
        }
    };
    init_tracing(&config.bot.log_level);

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(&config).await,
        Some(Commands::Status) => status::run_status(&config).await,
        Some(Commands::AddStaff { user_id }) => staff::run_add_staff(&config, &user_id).await,
        None => {
            println!("relaydesk: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("relaydesk: {e}");
        std::process::exit(1);
    }
}
