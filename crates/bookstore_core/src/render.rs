//! Fixed-width table rendering for book query results.

use crate::db::QueryOutcome;
use crate::model::book::{truncate_chars, AUTHOR_DISPLAY_CHARS, TITLE_DISPLAY_CHARS};
use rusqlite::types::Value;

const BOOK_COLUMNS: usize = 4;
const RULE_WIDTH: usize = 91;

/// Renders `(id, title, author, quantity)` rows as a table.
///
/// Returns `None` for every outcome that does not carry rows of that shape,
/// so callers can pass any outcome through without checking it first.
pub fn render_table(outcome: &QueryOutcome) -> Option<String> {
    let QueryOutcome::Rows(rows) = outcome else {
        return None;
    };
    if rows.iter().any(|row| row.len() != BOOK_COLUMNS) {
        return None;
    }

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format_line("ID", "Title", "Author", "Quantity"));
    lines.push("-".repeat(RULE_WIDTH));
    for row in rows {
        lines.push(format_line(
            &cell(&row[0], usize::MAX),
            &cell(&row[1], TITLE_DISPLAY_CHARS),
            &cell(&row[2], AUTHOR_DISPLAY_CHARS),
            &cell(&row[3], usize::MAX),
        ));
    }
    Some(lines.join("\n"))
}

fn format_line(id: &str, title: &str, author: &str, quantity: &str) -> String {
    format!("{id:<6}  {title:<40}  {author:<30}  {quantity:<12}")
        .trim_end()
        .to_string()
}

fn cell(value: &Value, max_chars: usize) -> String {
    match value {
        Value::Null => String::new(),
        Value::Integer(number) => number.to_string(),
        Value::Real(number) => number.to_string(),
        Value::Text(text) => truncate_chars(text, max_chars),
        Value::Blob(bytes) => format!("<{} bytes>", bytes.len()),
    }
}
