//! Book repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Build catalog statements and bind their parameters.
//! - Hand each statement to [`QueryExecutor`] and return its outcome unchanged.
//!
//! # Invariants
//! - Operator text is always bound as a parameter, never formatted into SQL.
//! - Write paths call `Book::validate()` before the store is touched.
//! - Update/delete of a missing id is `Success` (zero rows affected).
//! - The seed fixture is written only while no id was ever issued.

use crate::db::{QueryExecutor, QueryOutcome, StatementParams};
use crate::model::book::{Book, BookId, BookValidationError};
use log::{error, info, warn};
use rusqlite::types::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

const SCHEMA_SQL: &str = include_str!("books_schema.sql");

const INSERT_BOOK_SQL: &str =
    "INSERT INTO books (id, title, author, quantity) VALUES (?1, ?2, ?3, ?4);";

const SEARCH_BOOKS_SQL: &str = "SELECT id, title, author, quantity
FROM books
WHERE ?1 = ''
   OR instr(CAST(id AS TEXT), ?1) > 0
   OR instr(title, ?1) > 0
   OR instr(author, ?1) > 0
ORDER BY id ASC;";

const PROBE_BOOKS_SQL: &str = "SELECT id FROM books LIMIT 1;";

const PROBE_ISSUED_SQL: &str = "SELECT 1 FROM books
UNION ALL
SELECT 1 FROM book_id_watermark
LIMIT 1;";

const UPDATE_BOOK_SQL: &str =
    "UPDATE books SET title = ?1, author = ?2, quantity = ?3 WHERE id = ?4;";

const DELETE_BOOK_SQL: &str = "DELETE FROM books WHERE id = ?1;";

const HIGHEST_ID_SQL: &str = "SELECT MAX(top_id) FROM (
    SELECT MAX(id) AS top_id FROM books
    UNION ALL
    SELECT last_id AS top_id FROM book_id_watermark
);";

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors raised while turning stored rows back into domain values.
#[derive(Debug)]
pub enum RepoError {
    Validation(BookValidationError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted book data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<BookValidationError> for RepoError {
    fn from(value: BookValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Result of one fixture seed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedOutcome {
    /// Fixture rows written in one batch; `0` for an empty fixture.
    Inserted(usize),
    /// The catalog has issued ids before; nothing was written.
    Skipped,
    /// Probe or insert failed and the batch was rolled back.
    Failed(String),
}

/// Repository interface for catalog operations.
///
/// Every method maps to one executor call and reports a [`QueryOutcome`],
/// except [`BookRepository::seed_if_empty`] and [`BookRepository::next_id`]
/// which fold their reads into a seed result and an id.
pub trait BookRepository {
    /// Creates the catalog schema when absent. Safe to repeat.
    fn ensure_schema(&self) -> QueryOutcome;
    /// Reads at most one row to tell a populated catalog from an empty or missing one.
    fn probe(&self) -> QueryOutcome;
    /// Inserts `books` in one batch when the catalog never issued an id.
    fn seed_if_empty(&self, books: &[Book]) -> SeedOutcome;
    fn insert(&self, book: &Book) -> QueryOutcome;
    /// Case-sensitive substring match over id, title and author.
    fn search(&self, text: &str) -> QueryOutcome;
    fn update(&self, book: &Book) -> QueryOutcome;
    fn delete(&self, id: BookId) -> QueryOutcome;
    /// Returns one more than the highest id ever issued, or `1`.
    ///
    /// Saturates at `BookId::MAX`, which `Book::validate` refuses.
    fn next_id(&self) -> BookId;
}

/// SQLite-backed book repository. Owns no connection state.
#[derive(Debug, Clone)]
pub struct SqliteBookRepository {
    executor: QueryExecutor,
}

impl SqliteBookRepository {
    pub fn new(executor: QueryExecutor) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &QueryExecutor {
        &self.executor
    }

    fn write_validated(
        &self,
        book: &Book,
        sql: &str,
        params: StatementParams,
        event: &str,
    ) -> QueryOutcome {
        if let Err(err) = book.validate() {
            warn!(
                "event={event} module=repo status=rejected book_id={} error_code=validation_failed",
                book.id
            );
            return QueryOutcome::Failure(err.to_string());
        }

        let outcome = self.executor.execute(sql, params);
        log_write(event, book.id, &outcome);
        outcome
    }
}

impl BookRepository for SqliteBookRepository {
    fn ensure_schema(&self) -> QueryOutcome {
        let outcome = self.executor.execute(SCHEMA_SQL, StatementParams::None);
        match &outcome {
            QueryOutcome::Failure(err) => {
                warn!("event=schema_ensure module=repo status=error error={err}")
            }
            _ => info!("event=schema_ensure module=repo status=ok"),
        }
        outcome
    }

    fn probe(&self) -> QueryOutcome {
        self.executor.execute(PROBE_BOOKS_SQL, StatementParams::None)
    }

    fn seed_if_empty(&self, books: &[Book]) -> SeedOutcome {
        match self.executor.execute(PROBE_ISSUED_SQL, StatementParams::None) {
            QueryOutcome::Rows(_) => {
                info!("event=catalog_seed module=repo status=skipped reason=ids_issued");
                return SeedOutcome::Skipped;
            }
            QueryOutcome::Failure(err) => return SeedOutcome::Failed(err),
            QueryOutcome::Empty | QueryOutcome::Success => {}
        }

        if books.is_empty() {
            info!("event=catalog_seed module=repo status=skipped reason=empty_fixture");
            return SeedOutcome::Inserted(0);
        }

        if let Some(err) = books.iter().find_map(|book| book.validate().err()) {
            warn!("event=catalog_seed module=repo status=rejected error_code=validation_failed");
            return SeedOutcome::Failed(err.to_string());
        }

        let rows = books.iter().map(book_params).collect();
        match self
            .executor
            .execute(INSERT_BOOK_SQL, StatementParams::Batch(rows))
        {
            QueryOutcome::Failure(err) => {
                warn!("event=catalog_seed module=repo status=error error={err}");
                SeedOutcome::Failed(err)
            }
            _ => {
                info!(
                    "event=catalog_seed module=repo status=ok seeded={}",
                    books.len()
                );
                SeedOutcome::Inserted(books.len())
            }
        }
    }

    fn insert(&self, book: &Book) -> QueryOutcome {
        self.write_validated(
            book,
            INSERT_BOOK_SQL,
            StatementParams::Batch(vec![book_params(book)]),
            "book_insert",
        )
    }

    fn search(&self, text: &str) -> QueryOutcome {
        self.executor.execute(
            SEARCH_BOOKS_SQL,
            StatementParams::Single(vec![Value::Text(text.to_string())]),
        )
    }

    fn update(&self, book: &Book) -> QueryOutcome {
        self.write_validated(
            book,
            UPDATE_BOOK_SQL,
            StatementParams::Single(vec![
                Value::Text(book.title.clone()),
                Value::Text(book.author.clone()),
                Value::Integer(i64::from(book.quantity)),
                Value::Integer(book.id),
            ]),
            "book_update",
        )
    }

    fn delete(&self, id: BookId) -> QueryOutcome {
        let outcome = self.executor.execute(
            DELETE_BOOK_SQL,
            StatementParams::Single(vec![Value::Integer(id)]),
        );
        log_write("book_delete", id, &outcome);
        outcome
    }

    fn next_id(&self) -> BookId {
        match self.executor.execute(HIGHEST_ID_SQL, StatementParams::None) {
            QueryOutcome::Rows(rows) => match rows.first().and_then(|row| row.first()) {
                Some(Value::Integer(highest)) => highest.checked_add(1).unwrap_or_else(|| {
                    error!("event=id_allocate module=repo status=error error_code=id_space_exhausted");
                    BookId::MAX
                }),
                _ => 1,
            },
            _ => 1,
        }
    }
}

/// Decodes one `(id, title, author, quantity)` row.
pub fn book_from_row(row: &[Value]) -> RepoResult<Book> {
    let [id, title, author, quantity] = row else {
        return Err(RepoError::InvalidData(format!(
            "expected 4 columns, got {}",
            row.len()
        )));
    };

    let id = match id {
        Value::Integer(value) => *value,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid id value `{other:?}` in books.id"
            )))
        }
    };
    let quantity = match quantity {
        Value::Integer(value) => u16::try_from(*value).map_err(|_| {
            RepoError::InvalidData(format!("invalid quantity `{value}` in books.quantity"))
        })?,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid quantity value `{other:?}` in books.quantity"
            )))
        }
    };

    let book = Book::new(
        id,
        text_column(title, "title")?,
        text_column(author, "author")?,
        quantity,
    );
    book.validate()?;
    Ok(book)
}

/// Decodes every row of a read outcome.
pub fn decode_books(rows: &[Vec<Value>]) -> RepoResult<Vec<Book>> {
    rows.iter().map(|row| book_from_row(row)).collect()
}

fn text_column(value: &Value, column: &str) -> RepoResult<String> {
    match value {
        Value::Text(text) => Ok(text.clone()),
        other => Err(RepoError::InvalidData(format!(
            "invalid text value `{other:?}` in books.{column}"
        ))),
    }
}

fn book_params(book: &Book) -> Vec<Value> {
    vec![
        Value::Integer(book.id),
        Value::Text(book.title.clone()),
        Value::Text(book.author.clone()),
        Value::Integer(i64::from(book.quantity)),
    ]
}

fn log_write(event: &str, id: BookId, outcome: &QueryOutcome) {
    match outcome {
        QueryOutcome::Failure(err) => {
            warn!("event={event} module=repo status=error book_id={id} error={err}")
        }
        _ => info!("event={event} module=repo status=ok book_id={id}"),
    }
}
