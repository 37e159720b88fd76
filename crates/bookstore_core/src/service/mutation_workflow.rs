//! Search, disambiguate, then mutate workflow shared by update and delete.
//!
//! # Responsibility
//! - Resolve operator search text to exactly one book before mutating it.
//! - Collect the field edit (update) or the confirmation (delete).
//! - Issue exactly one repository write and map its outcome.
//!
//! # Invariants
//! - Cancel is honoured at every prompt and never touches the store.
//! - The selected book is a snapshot owned by one workflow run.
//! - `id` of the snapshot is never edited.

use crate::console::{ask, prompt_field, Console, Reply};
use crate::db::QueryOutcome;
use crate::model::book::{parse_quantity, validate_author, validate_title, Book};
use crate::repo::book_repo::{book_from_row, BookRepository};
use log::{info, warn};

/// Longest search text accepted by the search prompt.
pub const MAX_SEARCH_TEXT_CHARS: usize = 20;

pub const MSG_EMPTY_SEARCH: &str = "You have not typed anything in. Try again.";
pub const MSG_SEARCH_TOO_LONG: &str = "The text to search for is too long. Try again.";
pub const MSG_NO_RESULTS: &str = "Search yielded no results. Try again.";
pub const MSG_AMBIGUOUS: &str = "You can only proceed if the search yields exactly 1 result.";
pub const MSG_INVALID_OPTION: &str = "Invalid option.";
pub const MSG_CONFIRM_RETRY: &str = "Enter 'Y' or 'N'.";

const FIELD_MENU: &str = "What would you like to update?
1. Title
2. Author
3. Quantity
C. Cancel";

/// Terminal state of one interactive workflow run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowOutcome {
    /// Operator cancelled; the store was not written.
    Cancelled,
    /// The write was issued and not reported as a failure.
    Completed(Book),
    /// The write was issued and the store reported a failure.
    Aborted(String),
}

impl WorkflowOutcome {
    /// Boolean view used by the menu shell.
    pub fn succeeded(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    pub(crate) fn from_write(outcome: QueryOutcome, book: Book) -> Self {
        match outcome {
            QueryOutcome::Failure(message) => Self::Aborted(message),
            _ => Self::Completed(book),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Update,
    Delete,
}

impl MutationKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

enum Confirmation {
    Yes,
    No,
}

/// One update or delete interaction against a repository.
pub struct MutationWorkflow<'a, R, C>
where
    R: BookRepository + ?Sized,
    C: Console + ?Sized,
{
    repo: &'a R,
    console: &'a mut C,
}

impl<'a, R, C> MutationWorkflow<'a, R, C>
where
    R: BookRepository + ?Sized,
    C: Console + ?Sized,
{
    pub fn new(repo: &'a R, console: &'a mut C) -> Self {
        Self { repo, console }
    }

    pub fn run(&mut self, kind: MutationKind) -> WorkflowOutcome {
        match kind {
            MutationKind::Update => self.run_update(),
            MutationKind::Delete => self.run_delete(),
        }
    }

    /// Selects one book, edits one field and writes the snapshot back.
    pub fn run_update(&mut self) -> WorkflowOutcome {
        let kind = MutationKind::Update;
        let Some(selected) = self.select_single(kind) else {
            return cancelled(kind, "search");
        };
        let Some(edited) = self.edit_one_field(selected) else {
            return cancelled(kind, "field");
        };

        let outcome = self.repo.update(&edited);
        finish(kind, WorkflowOutcome::from_write(outcome, edited))
    }

    /// Selects one book, asks for confirmation and deletes it.
    pub fn run_delete(&mut self) -> WorkflowOutcome {
        let kind = MutationKind::Delete;
        let Some(selected) = self.select_single(kind) else {
            return cancelled(kind, "search");
        };
        match self.confirm_delete() {
            Confirmation::Yes => {}
            Confirmation::No => return cancelled(kind, "confirm"),
        }

        let outcome = self.repo.delete(selected.id);
        finish(kind, WorkflowOutcome::from_write(outcome, selected))
    }

    fn select_single(&mut self, kind: MutationKind) -> Option<Book> {
        self.console.show_message(&format!(
            "First search for a book to {} ('C' to cancel):",
            kind.as_str()
        ));

        loop {
            let text = match ask(&mut *self.console, "> ") {
                Reply::Cancel => return None,
                Reply::Text(text) => text,
            };
            if text.is_empty() {
                self.console.show_message(MSG_EMPTY_SEARCH);
                continue;
            }
            if text.chars().count() > MAX_SEARCH_TEXT_CHARS {
                self.console.show_message(MSG_SEARCH_TOO_LONG);
                continue;
            }

            let outcome = self.repo.search(&text);
            self.console.show_outcome(&outcome);
            match outcome {
                QueryOutcome::Rows(rows) if rows.len() == 1 => match book_from_row(&rows[0]) {
                    Ok(book) => return Some(book),
                    Err(err) => {
                        warn!(
                            "event=workflow_select module=workflow kind={} status=error error_code=invalid_row error={}",
                            kind.as_str(),
                            err
                        );
                        self.console.show_message(MSG_NO_RESULTS);
                    }
                },
                QueryOutcome::Rows(_) => self.console.show_message(MSG_AMBIGUOUS),
                QueryOutcome::Empty | QueryOutcome::Success | QueryOutcome::Failure(_) => {
                    self.console.show_message(MSG_NO_RESULTS)
                }
            }
        }
    }

    fn edit_one_field(&mut self, mut book: Book) -> Option<Book> {
        self.console.show_message(FIELD_MENU);
        loop {
            let selection = match ask(&mut *self.console, "> ") {
                Reply::Cancel => return None,
                Reply::Text(selection) => selection,
            };

            match selection.as_str() {
                "1" => {
                    book.title =
                        prompt_field(&mut *self.console, "Enter the new title:", validate_title)?;
                }
                "2" => {
                    book.author = prompt_field(
                        &mut *self.console,
                        "Enter the new author:",
                        validate_author,
                    )?;
                }
                "3" => {
                    book.quantity = prompt_field(
                        &mut *self.console,
                        "Enter the new quantity:",
                        parse_quantity,
                    )?;
                }
                _ => {
                    self.console.show_message(MSG_INVALID_OPTION);
                    continue;
                }
            }
            return Some(book);
        }
    }

    fn confirm_delete(&mut self) -> Confirmation {
        self.console
            .show_message("Are you sure you want to delete this book's data? ('Y' or 'N')");
        loop {
            match ask(&mut *self.console, "> ") {
                Reply::Cancel => return Confirmation::No,
                Reply::Text(answer) if answer.eq_ignore_ascii_case("y") => {
                    return Confirmation::Yes
                }
                Reply::Text(answer) if answer.eq_ignore_ascii_case("n") => {
                    return Confirmation::No
                }
                Reply::Text(_) => self.console.show_message(MSG_CONFIRM_RETRY),
            }
        }
    }
}

fn cancelled(kind: MutationKind, stage: &str) -> WorkflowOutcome {
    info!(
        "event=workflow_finish module=workflow kind={} status=cancelled stage={}",
        kind.as_str(),
        stage
    );
    WorkflowOutcome::Cancelled
}

fn finish(kind: MutationKind, outcome: WorkflowOutcome) -> WorkflowOutcome {
    match &outcome {
        WorkflowOutcome::Completed(book) => info!(
            "event=workflow_finish module=workflow kind={} status=completed book_id={}",
            kind.as_str(),
            book.id
        ),
        WorkflowOutcome::Aborted(err) => warn!(
            "event=workflow_finish module=workflow kind={} status=aborted error={}",
            kind.as_str(),
            err
        ),
        WorkflowOutcome::Cancelled => {}
    }
    outcome
}
