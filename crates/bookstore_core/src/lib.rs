//! Core domain logic for the bookstore inventory manager.
//! This crate is the single source of truth for catalog invariants.

pub mod config;
pub mod console;
pub mod db;
pub mod logging;
pub mod model;
pub mod render;
pub mod repo;
pub mod service;

pub use config::{config_path_from_env, reference_seed, BookstoreConfig, ConfigError};
pub use console::{Console, CANCEL_SENTINEL};
pub use db::{QueryExecutor, QueryOutcome, StatementParams};
pub use logging::{default_log_level, init_logging};
pub use model::book::{parse_quantity, Book, BookId, BookValidationError, BOOK_ID_MAX};
pub use render::render_table;
pub use repo::book_repo::{
    book_from_row, decode_books, BookRepository, RepoError, RepoResult, SeedOutcome,
    SqliteBookRepository,
};
pub use service::book_service::{BookService, CatalogState};
pub use service::mutation_workflow::{MutationKind, MutationWorkflow, WorkflowOutcome};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Builds a service over the SQLite store at `store_path`.
pub fn open_catalog(
    store_path: impl Into<std::path::PathBuf>,
) -> BookService<SqliteBookRepository> {
    BookService::new(SqliteBookRepository::new(QueryExecutor::new(store_path)))
}
