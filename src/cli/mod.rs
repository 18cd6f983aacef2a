//! Command-line interface definition and dispatch for salon-desk.
//!
//! Uses [`clap`] for argument parsing with derive macros. Running `salon`
//! with no subcommand starts the chat.

use crate::{chat, config, dashboard, provider, store::AppointmentStore};
use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

/// Top-level CLI structure for salon-desk.
#[derive(Parser)]
#[command(name = "salon", about = "Chat with the Grandeur Salon booking assistant")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
///
/// The `///` doc comments on variants double as `--help` text rendered by clap.
#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive chat with the assistant
    Chat {
        /// Provider to use (anthropic, openai, openrouter, ollama)
        #[arg(short, long)]
        provider: Option<String>,
        /// Model to use (overrides config)
        #[arg(short, long)]
        model: Option<String>,
    },
    /// Show every booked appointment
    Appointments,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Subcommands for the `config` command.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current config
    Show,
}

/// Parses command-line arguments into a [`Cli`] struct.
///
/// Delegates to [`clap::Parser::parse`], which exits the process on invalid input.
pub fn parse() -> Cli {
    Cli::parse()
}

/// Dispatches the parsed CLI command to its handler.
pub async fn run(cli: Cli) -> Result<()> {
    let command = cli.command.unwrap_or(Commands::Chat {
        provider: None,
        model: None,
    });

    match command {
        Commands::Chat {
            provider: provider_name,
            model,
        } => {
            let mut config = config::Config::load()?;
            let selection =
                provider::resolve_model(provider_name.as_deref(), model.as_deref(), &config)?;
            config.model = selection.model.clone();
            chat::run_chat(config, &selection).await
        }
        Commands::Appointments => {
            let config = config::Config::load()?;
            let store = match &config.store.seed_file {
                Some(path) => AppointmentStore::from_seed_file(path)?,
                None => AppointmentStore::seeded(),
            };
            dashboard::print_appointments(store.all());
            Ok(())
        }
        Commands::Config { action } => {
            let config = config::Config::load()?;
            match action {
                ConfigAction::Show => {
                    let path = config::Config::config_path()?;
                    println!("{} {}", "Config path:".bold(), path.display());
                    println!();
                    let toml_str = toml::to_string_pretty(&config)?;
                    println!("{}", toml_str);
                }
            }
            Ok(())
        }
    }
}
