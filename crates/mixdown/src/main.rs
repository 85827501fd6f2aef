// SPDX-FileCopyrightText: 2026 Mixdown Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mixdown - a chat-driven audio grabber bot.
//!
//! Binary entry point: loads and validates configuration, then runs the
//! requested subcommand.

mod health;
mod serve;
mod shutdown;

use clap::{Parser, Subcommand};

/// Mixdown - a chat-driven audio grabber bot.
#[derive(Parser, Debug)]
#[command(name = "mixdown", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the bot and serve chat events.
    Serve,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match mixdown_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            mixdown_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("mixdown serve failed: {e}");
                std::process::exit(1);
            }
        }
        None => {
            println!("mixdown: use --help for available commands");
        }
    }
}
