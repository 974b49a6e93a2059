//! Console session: two record screens driven by typed commands.
//!
//! Consultations is the landing screen. Each screen is activated (fetched)
//! the first time it is shown; switching back later keeps its collection and
//! criteria.

use crm_core::{BookingRecord, ConsultationRecord, Record};
use std::io::{self, BufRead, Write};

use crate::commands::{parse_command, Command, Screen};
use crate::controller::{Confirm, DeleteOutcome, FetchOutcome, ViewController};
use crate::render::{render_help, render_options, render_snapshot};

/// What the caller should do after a line was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Print this text (may be empty) and read the next line.
    Output(String),
    /// Leave the session.
    Quit,
}

pub struct Console {
    consultations: ViewController<ConsultationRecord>,
    bookings: ViewController<BookingRecord>,
    screen: Screen,
    visited_consultations: bool,
    visited_bookings: bool,
}

impl Console {
    pub fn new(
        consultations: ViewController<ConsultationRecord>,
        bookings: ViewController<BookingRecord>,
    ) -> Self {
        Self {
            consultations,
            bookings,
            screen: Screen::Consultations,
            visited_consultations: false,
            visited_bookings: false,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Show the landing screen, fetching it on first use.
    pub async fn start(&mut self) -> String {
        self.show(Screen::Consultations).await
    }

    /// Parse and run one input line.
    pub async fn handle_line(&mut self, line: &str) -> Reply {
        match parse_command(line) {
            Ok(Some(command)) => self.execute(command).await,
            Ok(None) => Reply::Output(String::new()),
            Err(err) => Reply::Output(format!("Error: {}", err)),
        }
    }

    pub async fn execute(&mut self, command: Command) -> Reply {
        let output = match command {
            Command::Quit => return Reply::Quit,
            Command::Help => render_help(),
            Command::Switch(screen) => self.show(screen).await,
            other => match self.screen {
                Screen::Consultations => run_on(&self.consultations, other).await,
                Screen::Bookings => run_on(&self.bookings, other).await,
            },
        };
        Reply::Output(output)
    }

    async fn show(&mut self, screen: Screen) -> String {
        self.screen = screen;
        let first_visit = match screen {
            Screen::Consultations => !std::mem::replace(&mut self.visited_consultations, true),
            Screen::Bookings => !std::mem::replace(&mut self.visited_bookings, true),
        };

        let mut lines = vec![format!("== {} ==", screen)];
        let body = match screen {
            Screen::Consultations => mount(&self.consultations, first_visit).await,
            Screen::Bookings => mount(&self.bookings, first_visit).await,
        };
        lines.push(body);
        lines.join("\n")
    }
}

async fn mount<R: Record>(controller: &ViewController<R>, first_visit: bool) -> String {
    if first_visit {
        tracing::debug!("First visit to {}", R::descriptor().label);
        let outcome = controller.activate().await;
        return with_fetch_notice(controller, outcome);
    }
    render_snapshot(&controller.snapshot())
}

/// Run a screen-scoped command against one controller.
async fn run_on<R: Record>(controller: &ViewController<R>, command: Command) -> String {
    let descriptor = R::descriptor();
    let result = match command {
        Command::List => Ok(()),
        Command::Search(text) => {
            controller.set_search_term(text);
            Ok(())
        }
        Command::Filter { name, value } => controller.set_filter(&name, &value),
        Command::Sort(key) => controller.set_sort(key),
        Command::Clear => {
            controller.clear_filters();
            Ok(())
        }
        Command::Options => return render_options(descriptor),
        Command::Refresh => {
            let outcome = controller.refresh().await;
            return with_fetch_notice(controller, outcome);
        }
        Command::Delete(id) => {
            let notice = match controller.delete(&id).await {
                DeleteOutcome::Deleted => format!("Deleted {} {}.", descriptor.kind, id),
                DeleteOutcome::Cancelled => return "Delete cancelled.".to_string(),
                DeleteOutcome::Failed => {
                    return format!("Error: could not delete {} {}.", descriptor.kind, id)
                }
            };
            return format!("{}\n{}", notice, render_snapshot(&controller.snapshot()));
        }
        Command::Switch(_) | Command::Help | Command::Quit => Ok(()),
    };

    match result {
        Ok(()) => render_snapshot(&controller.snapshot()),
        Err(err) => format!("Error: {}", err),
    }
}

fn with_fetch_notice<R: Record>(controller: &ViewController<R>, outcome: FetchOutcome) -> String {
    let view = render_snapshot(&controller.snapshot());
    match outcome {
        FetchOutcome::Loaded(_) => view,
        FetchOutcome::Failed => format!(
            "Error: could not load {}. Showing last known data.\n{}",
            R::descriptor().label,
            view
        ),
        FetchOutcome::Skipped => "A refresh is already in progress.".to_string(),
    }
}

// =============================================================================
// Terminal Confirmation
// =============================================================================

/// Asks on stdout and reads a `y`/`yes` answer from stdin.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, message: &str) -> bool {
        let mut stdout = io::stdout();
        if write!(stdout, "{} [y/N] ", message)
            .and_then(|_| stdout.flush())
            .is_err()
        {
            return false;
        }

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_affirmative(&answer),
            Err(err) => {
                tracing::warn!("Failed to read confirmation: {}", err);
                false
            }
        }
    }
}

/// Only an explicit yes confirms.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
