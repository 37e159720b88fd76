//! SQLite storage bootstrap and query execution entry points.
//!
//! # Responsibility
//! - Open and configure per-call SQLite connections for the catalog store.
//! - Execute one statement per call and fold its outcome into [`QueryOutcome`].
//!
//! # Invariants
//! - A connection never outlives the executor call that opened it.
//! - No store error escapes [`QueryExecutor::execute`]; it becomes
//!   [`QueryOutcome::Failure`].

use std::error::Error;
use std::fmt::{Display, Formatter};

mod executor;
mod open;

pub use executor::{QueryExecutor, QueryOutcome, StatementParams};
pub use open::open_store;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    EmptyStorePath,
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::EmptyStorePath => write!(f, "store path cannot be empty"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::EmptyStorePath => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
