//! Catalog use-case service.
//!
//! # Responsibility
//! - Bootstrap the catalog (schema + configured seed fixture).
//! - Run the insertion, search, update and delete interactions.
//!
//! # Invariants
//! - Seeding only happens while the catalog has never issued an id.
//! - Insertion allocates its id before prompting and writes once at the end.
//! - Service APIs never bypass repository validation/persistence contracts.

use crate::console::{ask, prompt_field, Console, Reply};
use crate::db::QueryOutcome;
use crate::model::book::{parse_quantity, validate_author, validate_id, validate_title, Book};
use crate::repo::book_repo::{BookRepository, SeedOutcome};
use crate::service::mutation_workflow::{
    MutationKind, MutationWorkflow, WorkflowOutcome, MAX_SEARCH_TEXT_CHARS, MSG_SEARCH_TOO_LONG,
};
use log::{info, warn};

/// Catalog state after start-up bootstrap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogState {
    /// The catalog holds books, or held some before being emptied; nothing was written.
    Ready,
    /// Schema ensured and `n` fixture books inserted (`0` without a fixture).
    Seeded(usize),
    /// Schema ensured but the fixture insert failed and was rolled back.
    SeedFailed(String),
    /// The schema could not be created.
    Unavailable(String),
}

/// Use-case facade called by the menu shell.
pub struct BookService<R: BookRepository> {
    repo: R,
}

impl<R: BookRepository> BookService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Probes the catalog and creates/seeds it when it never issued an id.
    ///
    /// An emptied catalog is not reseeded: fixture ids would be issued twice.
    pub fn bootstrap(&self, fixture: &[Book]) -> CatalogState {
        if let QueryOutcome::Rows(_) = self.repo.probe() {
            info!("event=catalog_bootstrap module=service status=ok state=ready");
            return CatalogState::Ready;
        }

        if let QueryOutcome::Failure(err) = self.repo.ensure_schema() {
            warn!("event=catalog_bootstrap module=service status=error state=unavailable");
            return CatalogState::Unavailable(err);
        }

        match self.repo.seed_if_empty(fixture) {
            SeedOutcome::Inserted(count) => {
                info!("event=catalog_bootstrap module=service status=ok state=seeded count={count}");
                CatalogState::Seeded(count)
            }
            SeedOutcome::Skipped => {
                info!("event=catalog_bootstrap module=service status=ok state=ready reason=ids_issued");
                CatalogState::Ready
            }
            SeedOutcome::Failed(err) => {
                warn!("event=catalog_bootstrap module=service status=error state=seed_failed");
                CatalogState::SeedFailed(err)
            }
        }
    }

    /// Collects a new book from the operator and inserts it.
    pub fn enter_book<C: Console + ?Sized>(&self, console: &mut C) -> WorkflowOutcome {
        let id = match validate_id(self.repo.next_id()) {
            Ok(id) => id,
            Err(err) => {
                warn!("event=workflow_finish module=workflow kind=insert status=aborted error_code=id_unavailable");
                return WorkflowOutcome::Aborted(err.to_string());
            }
        };

        let Some(title) = prompt_field(console, "Enter Book Title or 'C' to cancel:", validate_title)
        else {
            return insert_cancelled("title");
        };
        let Some(author) = prompt_field(console, "Enter Author or 'C' to cancel:", validate_author)
        else {
            return insert_cancelled("author");
        };
        let Some(quantity) = prompt_field(
            console,
            "Enter Book quantity (0 - 9999) or 'C' to cancel:",
            parse_quantity,
        ) else {
            return insert_cancelled("quantity");
        };

        let book = Book::new(id, title, author, quantity);
        let outcome = WorkflowOutcome::from_write(self.repo.insert(&book), book);
        match &outcome {
            WorkflowOutcome::Completed(book) => info!(
                "event=workflow_finish module=workflow kind=insert status=completed book_id={}",
                book.id
            ),
            WorkflowOutcome::Aborted(err) => warn!(
                "event=workflow_finish module=workflow kind=insert status=aborted error={err}"
            ),
            WorkflowOutcome::Cancelled => {}
        }
        outcome
    }

    /// Prompts for search text, runs the search and shows the result.
    ///
    /// Empty text lists every book. Returns `None` when the operator cancels.
    pub fn search_books<C: Console + ?Sized>(&self, console: &mut C) -> Option<QueryOutcome> {
        let text = loop {
            match ask(console, "Enter text to search for or 'C' to cancel:\n> ") {
                Reply::Cancel => return None,
                Reply::Text(text) if text.chars().count() > MAX_SEARCH_TEXT_CHARS => {
                    console.show_message(MSG_SEARCH_TOO_LONG);
                }
                Reply::Text(text) => break text,
            }
        };

        let outcome = self.repo.search(&text);
        match &outcome {
            QueryOutcome::Rows(_) => console.show_outcome(&outcome),
            QueryOutcome::Empty | QueryOutcome::Success => {
                console.show_message("Search yielded no results.")
            }
            QueryOutcome::Failure(err) => console.show_message(&format!("Search failed: {err}")),
        }
        Some(outcome)
    }

    /// Runs the update workflow.
    pub fn update_book<C: Console + ?Sized>(&self, console: &mut C) -> WorkflowOutcome {
        MutationWorkflow::new(&self.repo, console).run(MutationKind::Update)
    }

    /// Runs the delete workflow.
    pub fn delete_book<C: Console + ?Sized>(&self, console: &mut C) -> WorkflowOutcome {
        MutationWorkflow::new(&self.repo, console).run(MutationKind::Delete)
    }
}

fn insert_cancelled(stage: &str) -> WorkflowOutcome {
    info!("event=workflow_finish module=workflow kind=insert status=cancelled stage={stage}");
    WorkflowOutcome::Cancelled
}
