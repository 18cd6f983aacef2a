//! Entry point for salon-desk, a chat assistant for salon appointments.
//!
//! This binary loads environment variables, sets up logging, parses CLI
//! arguments via [`cli`], and dispatches to the chosen subcommand.

mod chat;
mod cli;
mod config;
mod constants;
mod dashboard;
mod format;
mod message;
mod provider;
mod service;
mod store;
mod tools;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Runs the salon CLI.
///
/// Loads `.env` files (silently ignored if absent). Logs go to stderr,
/// filtered by `RUST_LOG` (default `warn`), so they stay out of the chat.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(constants::DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = cli::parse();
    cli::run(cli).await
}
