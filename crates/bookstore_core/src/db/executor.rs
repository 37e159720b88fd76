//! Generic statement executor with a discriminated outcome.
//!
//! # Responsibility
//! - Route one statement to the read, batched-write or single-write path.
//! - Fold rows, empty reads, committed writes and errors into [`QueryOutcome`].
//!
//! # Invariants
//! - Every call opens its own connection and drops it before returning.
//! - Write paths run inside one transaction; any error rolls it back.
//! - Statement text is executed as given. Callers bind untrusted text through
//!   [`StatementParams`], never by formatting it into `sql`.

use super::open::open_store;
use log::{debug, error, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Transaction};
use std::path::{Path, PathBuf};
use std::time::Instant;

static READ_STATEMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*(select|with)\b").expect("valid read statement regex"));

/// Outcome of exactly one executor call.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// Read statement returned at least one row.
    Rows(Vec<Vec<Value>>),
    /// Read statement returned no rows.
    Empty,
    /// Write or DDL statement was committed.
    Success,
    /// Execution failed and any open transaction was rolled back.
    Failure(String),
}

impl QueryOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// Number of returned rows; `0` for every non-`Rows` outcome.
    pub fn row_count(&self) -> usize {
        match self {
            Self::Rows(rows) => rows.len(),
            _ => 0,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Rows(_) => "rows",
            Self::Empty => "empty",
            Self::Success => "success",
            Self::Failure(_) => "failure",
        }
    }
}

/// Positional parameters bound to one statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum StatementParams {
    #[default]
    None,
    /// One parameter tuple for a read or a single write.
    Single(Vec<Value>),
    /// Many parameter tuples applied to one write statement in one commit.
    Batch(Vec<Vec<Value>>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatementKind {
    Read,
    BatchWrite,
    Write,
}

impl StatementKind {
    fn classify(sql: &str, params: &StatementParams) -> Self {
        if READ_STATEMENT_RE.is_match(sql) {
            Self::Read
        } else if matches!(params, StatementParams::Batch(_)) {
            Self::BatchWrite
        } else {
            Self::Write
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::BatchWrite => "batch_write",
            Self::Write => "write",
        }
    }
}

/// Stateless executor bound to one store file.
#[derive(Debug, Clone)]
pub struct QueryExecutor {
    store_path: PathBuf,
}

impl QueryExecutor {
    pub fn new(store_path: impl Into<PathBuf>) -> Self {
        Self {
            store_path: store_path.into(),
        }
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    /// Executes one statement against a freshly opened connection.
    ///
    /// Never returns an error: open, prepare, execute and commit failures are
    /// all reported as [`QueryOutcome::Failure`].
    pub fn execute(&self, sql: &str, params: StatementParams) -> QueryOutcome {
        let started_at = Instant::now();
        let kind = StatementKind::classify(sql, &params);

        let mut conn = match open_store(&self.store_path) {
            Ok(conn) => conn,
            Err(err) => {
                error!(
                    "event=query_execute module=db status=error kind={} duration_ms={} error_code=store_open_failed error={}",
                    kind.as_str(),
                    started_at.elapsed().as_millis(),
                    err
                );
                return QueryOutcome::Failure(err.to_string());
            }
        };

        let result = match (kind, params) {
            (StatementKind::Read, StatementParams::Batch(_)) => Err(ExecError::Unsupported(
                "batch parameters cannot be bound to a read statement",
            )),
            (StatementKind::Read, StatementParams::Single(values)) => {
                fetch_rows(&conn, sql, &values).map_err(ExecError::from)
            }
            (StatementKind::Read, StatementParams::None) => {
                fetch_rows(&conn, sql, &[]).map_err(ExecError::from)
            }
            (_, StatementParams::Batch(rows)) => write_batch(&mut conn, sql, &rows),
            (_, StatementParams::Single(values)) => write_single(&mut conn, sql, &values),
            (_, StatementParams::None) => write_script(&mut conn, sql),
        };
        drop(conn);

        match result {
            Ok(outcome) => {
                debug!(
                    "event=query_execute module=db status=ok kind={} outcome={} rows={} duration_ms={}",
                    kind.as_str(),
                    outcome.label(),
                    outcome.row_count(),
                    started_at.elapsed().as_millis()
                );
                outcome
            }
            Err(err) => {
                warn!(
                    "event=query_execute module=db status=error kind={} duration_ms={} error_code={} error={}",
                    kind.as_str(),
                    started_at.elapsed().as_millis(),
                    err.code(),
                    err
                );
                QueryOutcome::Failure(err.to_string())
            }
        }
    }
}

#[derive(Debug)]
enum ExecError {
    Sqlite(rusqlite::Error),
    Unsupported(&'static str),
}

impl ExecError {
    fn code(&self) -> &'static str {
        match self {
            Self::Sqlite(_) => "statement_failed",
            Self::Unsupported(_) => "unsupported_params",
        }
    }
}

impl std::fmt::Display for ExecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Unsupported(message) => write!(f, "{message}"),
        }
    }
}

impl From<rusqlite::Error> for ExecError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

fn fetch_rows(conn: &Connection, sql: &str, values: &[Value]) -> rusqlite::Result<QueryOutcome> {
    let mut stmt = conn.prepare(sql)?;
    let column_count = stmt.column_count();
    let mut rows = stmt.query(params_from_iter(values.iter()))?;
    let mut fetched = Vec::new();

    while let Some(row) = rows.next()? {
        let mut tuple = Vec::with_capacity(column_count);
        for index in 0..column_count {
            tuple.push(row.get::<_, Value>(index)?);
        }
        fetched.push(tuple);
    }

    if fetched.is_empty() {
        Ok(QueryOutcome::Empty)
    } else {
        Ok(QueryOutcome::Rows(fetched))
    }
}

fn write_batch(
    conn: &mut Connection,
    sql: &str,
    rows: &[Vec<Value>],
) -> Result<QueryOutcome, ExecError> {
    in_transaction(conn, |tx| {
        let mut stmt = tx.prepare(sql)?;
        for row in rows {
            stmt.execute(params_from_iter(row.iter()))?;
        }
        Ok(())
    })
}

fn write_single(
    conn: &mut Connection,
    sql: &str,
    values: &[Value],
) -> Result<QueryOutcome, ExecError> {
    in_transaction(conn, |tx| {
        let changed = tx.execute(sql, params_from_iter(values.iter()))?;
        debug!("event=query_write module=db status=ok changed_rows={changed}");
        Ok(())
    })
}

fn write_script(conn: &mut Connection, sql: &str) -> Result<QueryOutcome, ExecError> {
    in_transaction(conn, |tx| tx.execute_batch(sql))
}

fn in_transaction<F>(conn: &mut Connection, apply: F) -> Result<QueryOutcome, ExecError>
where
    F: FnOnce(&Transaction<'_>) -> rusqlite::Result<()>,
{
    let tx = conn.transaction()?;
    match apply(&tx) {
        Ok(()) => {
            tx.commit()?;
            Ok(QueryOutcome::Success)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback() {
                error!(
                    "event=query_rollback module=db status=error error={}",
                    rollback_err
                );
            }
            Err(err.into())
        }
    }
}
