// SPDX-FileCopyrightText: 2026 FeedbackBot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! FeedbackBot - anonymous feedback bots for Telegram groups.
//!
//! This is the binary entry point.

mod doctor;
mod serve;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use feedbackbot_config::{ConfigError, FeedbackBotConfig};

/// FeedbackBot - anonymous feedback bots for Telegram groups.
#[derive(Parser, Debug)]
#[command(name = "feedbackbot", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Poll every verified bot until interrupted.
    Serve,
    /// Check configuration, database and bot tokens.
    Doctor {
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
}

fn load_config(path: Option<&Path>) -> Result<FeedbackBotConfig, Vec<ConfigError>> {
    match path {
        Some(path) => feedbackbot_config::load_and_validate_path(path),
        None => feedbackbot_config::load_and_validate(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            feedbackbot_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Doctor { plain }) => {
            match doctor::run_doctor(&config, cli.config.as_deref(), plain).await {
                Ok(0) => {}
                Ok(_) => std::process::exit(1),
                Err(e) => {
                    eprintln!("error: {e}");
                    std::process::exit(1);
                }
            }
        }
        None => {
            println!("feedbackbot: use --help for available commands");
        }
    }
}
