//! Interactive salon chat for the terminal.
//!
//! [`run_chat`] wires the appointment store, tool registry and rig-backed
//! model service into a [`Conversation`] and drives it from a [`rustyline`]
//! prompt. The orchestration loop itself lives in [`turn`].

mod commands;
mod turn;

pub use turn::{Conversation, LoopSettings, UnknownToolPolicy};

use anyhow::Result;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::{self, Write};

use crate::config::Config;
use crate::format;
use crate::message::Sender;
use crate::provider::{ModelSelection, RigService};
use crate::store::AppointmentStore;
use crate::tools::ToolRegistry;

/// Runs the interactive chat REPL.
///
/// Opens a model session, prints the greeting, then hands each line the user
/// types to [`Conversation::submit`]. Input is not read while a turn is in
/// flight, so turns never overlap.
///
/// # Readline behavior
///
/// - **Ctrl+C**: cancels current input, stays in REPL
/// - **Ctrl+D**: exits cleanly with "goodbye."
/// - Readline history is persisted to `~/.cache/salon-desk/chat_history.txt`
pub async fn run_chat(config: Config, selection: &ModelSelection) -> Result<()> {
    let store = match &config.store.seed_file {
        Some(path) => AppointmentStore::from_seed_file(path)?,
        None => AppointmentStore::seeded(),
    };
    let tools = ToolRegistry::with_builtins();
    let definitions = tools.definitions();
    let mut conversation = Conversation::new(store, tools, config.loop_settings());

    println!(
        "{} [provider: {}] [model: {}] (/help for commands, Ctrl+D to exit)",
        crate::constants::SALON_NAME.bold().cyan(),
        selection.provider.to_string().yellow(),
        selection.model.yellow(),
    );
    println!();

    let mut printed = 0;
    let service = match RigService::from_config(&config, selection, definitions) {
        Ok(service) => Some(service),
        Err(err) => {
            conversation.initialization_failed(&err);
            None
        }
    };
    let mut session = match &service {
        Some(service) => with_typing_indicator(conversation.initialize(service)).await,
        None => None,
    };
    print_new_replies(&conversation, &mut printed);

    // Set up readline with persistent history
    let mut rl = DefaultEditor::new()?;
    let history_path = Config::cache_dir()?.join(crate::constants::HISTORY_FILENAME);
    if history_path.exists() {
        let _ = rl.load_history(&history_path);
    }

    loop {
        let readline = rl.readline(&format!("{} ", ">".green().bold()));

        match readline {
            Ok(line) => {
                let text = match classify(&line) {
                    Input::Blank => continue,
                    Input::Command(cmd) => {
                        if let commands::CommandAction::Unknown(cmd) =
                            commands::handle_slash_command(cmd, &conversation)
                        {
                            println!("{} Unknown command: {}", "?".yellow(), cmd);
                        }
                        continue;
                    }
                    Input::Text(text) => text,
                };

                let _ = rl.add_history_entry(text);

                let (Some(service), Some(session)) = (&service, session.as_mut()) else {
                    println!(
                        "{}",
                        "The assistant is unavailable. Fix the configuration and restart.".dimmed()
                    );
                    continue;
                };

                println!();
                let outcome =
                    with_typing_indicator(conversation.submit(service, session, text)).await;
                tracing::debug!(?outcome, "turn finished");
                print_new_replies(&conversation, &mut printed);
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "^C".dimmed());
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "goodbye.".dimmed());
                break;
            }
            Err(e) => {
                eprintln!("{} {}", "error:".red().bold(), e);
                break;
            }
        }
    }

    // Save readline history
    if let Some(parent) = history_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let _ = rl.save_history(&history_path);

    Ok(())
}

/// What a line read from the prompt asks for.
#[derive(Debug, PartialEq)]
enum Input<'a> {
    Blank,
    /// A slash command, trimmed.
    Command(&'a str),
    /// Text for the assistant, exactly as typed.
    Text(&'a str),
}

fn classify(line: &str) -> Input<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        Input::Blank
    } else if trimmed.starts_with('/') {
        Input::Command(trimmed)
    } else {
        Input::Text(line)
    }
}

/// Shows a "typing" line while `fut` runs, then erases it.
async fn with_typing_indicator<F: std::future::Future>(fut: F) -> F::Output {
    println!("{}", "salon is typing...".dimmed());
    let output = fut.await;
    print!("\x1b[1A\x1b[2K");
    io::stdout().flush().ok();
    output
}

/// Prints bot messages appended to the log since the last call.
fn print_new_replies(conversation: &Conversation, printed: &mut usize) {
    let messages = conversation.log().all();
    for msg in messages.iter().skip(*printed) {
        if msg.sender == Sender::Bot {
            println!("{}", format::format_message(msg));
            println!();
        }
    }
    *printed = conversation.log().len();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_keeps_raw_text() {
        assert_eq!(classify("  Hi, I'm Jane Doe  "), Input::Text("  Hi, I'm Jane Doe  "));
    }

    #[test]
    fn test_classify_commands_and_blanks() {
        assert_eq!(classify(" /menu "), Input::Command("/menu"));
        assert_eq!(classify("   "), Input::Blank);
        assert_eq!(classify(""), Input::Blank);
    }
}
