//! Console command parsing.
//!
//! One command per input line. The first word names the command; the rest of
//! the line is its argument, so filter values and search terms may contain
//! spaces.

use crm_core::{CriteriaError, RecordId, SortKey};
use std::fmt;

/// The two record screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Consultations,
    Bookings,
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Screen::Consultations => f.write_str("consultations"),
            Screen::Bookings => f.write_str("bookings"),
        }
    }
}

/// A parsed console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Switch(Screen),
    List,
    Search(String),
    Filter { name: String, value: String },
    Sort(SortKey),
    Clear,
    Refresh,
    Delete(RecordId),
    Options,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command '{0}' (type 'help' for a list)")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error(transparent)]
    BadSort(#[from] CriteriaError),
}

/// Command names with usage and a one-line description, in help order.
pub fn available_commands() -> &'static [(&'static str, &'static str)] {
    &[
        ("consultations", "switch to the consultations screen"),
        ("bookings", "switch to the bookings screen"),
        ("list", "show the current screen"),
        ("search <text>", "search records (no text clears the search)"),
        ("filter <name> <value>", "set a filter ('all' resets it)"),
        ("sort <key>", "sort by newest, oldest, name or package"),
        ("clear", "clear search, filters and sort"),
        ("refresh", "reload from the server"),
        ("delete <id>", "delete a record after confirmation"),
        ("options", "list filters, values and sort keys"),
        ("help", "show this list"),
        ("quit", "leave the console"),
    ]
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };

    let command = match name {
        // Navigation
        "consultations" => Command::Switch(Screen::Consultations),
        "bookings" => Command::Switch(Screen::Bookings),

        // Criteria
        "search" => Command::Search(rest.to_string()),
        "filter" => {
            let (filter, value) = rest
                .split_once(char::is_whitespace)
                .ok_or(CommandError::Usage("filter <name> <value>"))?;
            Command::Filter {
                name: filter.to_string(),
                value: value.trim().to_string(),
            }
        }
        "sort" => {
            if rest.is_empty() {
                return Err(CommandError::Usage("sort <newest|oldest|name|package>"));
            }
            Command::Sort(rest.parse()?)
        }
        "clear" => Command::Clear,

        // Collection
        "list" => Command::List,
        "refresh" => Command::Refresh,
        "delete" => {
            if rest.is_empty() {
                return Err(CommandError::Usage("delete <id>"));
            }
            Command::Delete(RecordId::from(rest))
        }

        // Misc
        "options" => Command::Options,
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,

        other => return Err(CommandError::Unknown(other.to_string())),
    };

    Ok(Some(command))
}
