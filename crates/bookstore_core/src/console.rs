//! Operator console collaborator used by interactive workflows.
//!
//! # Responsibility
//! - Abstract blocking line input and message output away from workflows.
//! - Recognise the cancel sentinel in one place.
//!
//! # Invariants
//! - End of input is treated exactly like an explicit cancel.
//! - Replies are trimmed before workflows inspect them.

use crate::db::QueryOutcome;
use crate::model::book::BookValidationError;
use crate::render::render_table;

/// Reply that cancels the current workflow, compared case-insensitively.
pub const CANCEL_SENTINEL: &str = "c";

/// Line-oriented operator I/O.
pub trait Console {
    /// Shows `prompt` and blocks for one line. `None` means input is closed.
    fn read_line(&mut self, prompt: &str) -> Option<String>;

    /// Shows an informational or validation message.
    fn show_message(&mut self, message: &str);

    /// Shows a query result; outcomes without book rows are not rendered.
    fn show_outcome(&mut self, outcome: &QueryOutcome) {
        if let Some(table) = render_table(outcome) {
            self.show_message(&table);
        }
    }
}

/// One trimmed operator reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Cancel,
    Text(String),
}

/// Reads one reply, mapping the sentinel and end of input to [`Reply::Cancel`].
pub fn ask<C: Console + ?Sized>(console: &mut C, prompt: &str) -> Reply {
    match console.read_line(prompt) {
        None => Reply::Cancel,
        Some(line) => {
            let trimmed = line.trim();
            if trimmed.eq_ignore_ascii_case(CANCEL_SENTINEL) {
                Reply::Cancel
            } else {
                Reply::Text(trimmed.to_string())
            }
        }
    }
}

/// Shows `heading`, then re-prompts until `parse` accepts a reply.
///
/// Every rejection is shown to the operator. Returns `None` on cancel.
pub fn prompt_field<C, T, F>(console: &mut C, heading: &str, parse: F) -> Option<T>
where
    C: Console + ?Sized,
    F: Fn(&str) -> Result<T, BookValidationError>,
{
    console.show_message(heading);
    loop {
        match ask(console, "> ") {
            Reply::Cancel => return None,
            Reply::Text(text) => match parse(&text) {
                Ok(value) => return Some(value),
                Err(err) => console.show_message(&format!("{err} Try again.")),
            },
        }
    }
}
