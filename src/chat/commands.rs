//! Slash command handlers for the chat REPL.
//!
//! Dispatches `/appointments`, `/history`, `/menu`, and `/help`. Commands
//! only read conversation state; none of them talk to the model.

use colored::Colorize;

use super::Conversation;
use crate::constants::KEYWORD_BUTTONS;
use crate::{dashboard, format};

/// Action returned by slash command handling.
#[derive(Debug, PartialEq)]
pub(crate) enum CommandAction {
    /// Command was handled; continue the REPL loop.
    Continue,
    /// Unknown command was entered.
    Unknown(String),
}

/// Dispatch and handle a slash command.
pub(crate) fn handle_slash_command(command: &str, conversation: &Conversation) -> CommandAction {
    match command {
        "/appointments" => {
            dashboard::print_appointments(conversation.store().all());
            CommandAction::Continue
        }
        "/history" => {
            for msg in conversation.log().all() {
                println!("{}", format::format_message(msg));
                println!();
            }
            CommandAction::Continue
        }
        "/menu" => {
            println!("{}", "Try one of:".bold());
            for keyword in KEYWORD_BUTTONS {
                println!("  {}", keyword.cyan());
            }
            CommandAction::Continue
        }
        "/help" => {
            println!("{}", "Commands:".bold());
            println!("  {} - show every booking", "/appointments".cyan());
            println!("  {} - show the conversation so far", "/history".cyan());
            println!("  {} - show menu keywords", "/menu".cyan());
            println!("  {} - show this help", "/help".cyan());
            println!("  {} - exit", "Ctrl+D".cyan());
            CommandAction::Continue
        }
        _ => CommandAction::Unknown(command.to_string()),
    }
}
