//! Special commands parser for interactive chat mode
//!
//! Special commands are handled by the client instead of being sent to the
//! backend as questions. They let the user:
//! - Upload spreadsheets
//! - Ask explicitly for a chart
//! - Start a new backend session
//! - View session status
//! - Display help information
//! - Exit the session
//!
//! Commands are prefixed with `/` and are case-insensitive; their arguments
//! keep the case they were typed in.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an argument it does not take
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands that can be executed during interactive chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Upload one or more spreadsheets from disk
    Upload(Vec<PathBuf>),

    /// Ask the backend explicitly for a chart
    Chart(String),

    /// Forget the backend session and start a new one on the next call
    Reset,

    /// Display session and upload status
    ShowStatus,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command
    ///
    /// The input should be submitted as a question.
    None,
}

/// Parse a user input string into a special command
///
/// # Errors
///
/// Returns `CommandError::UnknownCommand` if input starts with "/" but is not a valid command.
/// Returns `CommandError::MissingArgument` if `/upload` or `/chart` has no argument.
/// Returns `CommandError::UnsupportedArgument` if an argument-less command gets one.
///
/// # Examples
///
/// ```
/// use sheetchat::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(
///     parse_special_command("/chart Revenue by Month").unwrap(),
///     SpecialCommand::Chart("Revenue by Month".to_string())
/// );
/// assert_eq!(
///     parse_special_command("what is total revenue?").unwrap(),
///     SpecialCommand::None
/// );
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    // If input doesn't start with "/", it's not a command (except exit/quit)
    if !trimmed.starts_with('/') {
        return Ok(match lower.as_str() {
            "exit" | "quit" => SpecialCommand::Exit,
            _ => SpecialCommand::None,
        });
    }

    let (command, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((command, rest)) => (command.to_lowercase(), rest.trim()),
        None => (lower.clone(), ""),
    };

    match command.as_str() {
        "/upload" | "/u" => {
            if rest.is_empty() {
                return Err(CommandError::MissingArgument {
                    command: "/upload".to_string(),
                    usage: "/upload <file.xlsx> [more files...]".to_string(),
                });
            }
            Ok(SpecialCommand::Upload(
                rest.split_whitespace().map(PathBuf::from).collect(),
            ))
        }
        "/chart" | "/viz" => {
            if rest.is_empty() {
                return Err(CommandError::MissingArgument {
                    command: "/chart".to_string(),
                    usage: "/chart <description of the chart>".to_string(),
                });
            }
            Ok(SpecialCommand::Chart(rest.to_string()))
        }
        "/reset" | "/status" | "/help" | "/?" | "/exit" | "/quit" if !rest.is_empty() => {
            Err(CommandError::UnsupportedArgument {
                command: command.clone(),
                arg: rest.to_string(),
            })
        }
        "/reset" => Ok(SpecialCommand::Reset),
        "/status" => Ok(SpecialCommand::ShowStatus),
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "/exit" | "/quit" => Ok(SpecialCommand::Exit),
        _ => Err(CommandError::UnknownCommand(command.clone())),
    }
}

/// Display help text for special commands
pub fn print_help() {
    println!(
        r#"
Special Commands for Interactive Chat Mode
===========================================

DATA:
  /upload <files...>  - Upload .xlsx or .xls files (space separated)
  /u <files...>       - Shorthand for /upload

CHARTS:
  /chart <request>    - Ask explicitly for a chart, e.g. /chart revenue by month
  /viz <request>      - Same as /chart

SESSION:
  /status             - Show session and upload status
  /reset              - Start a new backend session on the next request
  /help               - Show this help message
  /?                  - Same as /help

SESSION CONTROL:
  exit                - Exit interactive mode
  quit                - Same as exit

NOTES:
  - Commands are case-insensitive
  - Regular text (not starting with /) is sent as a question
  - Upload at least one spreadsheet before asking questions
  - Questions that ask for a chart are answered with one automatically
"#
    );
}
