//! Book domain model.
//!
//! # Responsibility
//! - Define the catalog record and its field constraints.
//! - Parse raw operator input into validated field values.
//!
//! # Invariants
//! - `id` lies in `[1, BOOK_ID_MAX]` and never changes after insertion.
//! - `title` and `author` are non-empty after trimming.
//! - `quantity` stays within `[QUANTITY_MIN, QUANTITY_MAX]`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable catalog identifier.
pub type BookId = i64;

/// Highest storable id. One below `i64::MAX` so `highest + 1` always fits.
pub const BOOK_ID_MAX: BookId = BookId::MAX - 1;
pub const QUANTITY_MIN: u16 = 0;
pub const QUANTITY_MAX: u16 = 9999;
pub const TITLE_DISPLAY_CHARS: usize = 40;
pub const AUTHOR_DISPLAY_CHARS: usize = 30;

static DIGITS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").expect("valid digits regex"));

/// Field-level validation failures for book input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookValidationError {
    InvalidId(BookId),
    EmptyTitle,
    EmptyAuthor,
    EmptyQuantity,
    NotANumber(String),
    QuantityOutOfRange(String),
}

impl Display for BookValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidId(id) => {
                write!(f, "book id must be between 1 and {BOOK_ID_MAX}, got {id}")
            }
            Self::EmptyTitle => write!(f, "Title cannot be empty."),
            Self::EmptyAuthor => write!(f, "Author cannot be empty."),
            Self::EmptyQuantity => write!(f, "Quantity cannot be empty."),
            Self::NotANumber(_) => write!(f, "Please enter a valid number."),
            Self::QuantityOutOfRange(_) => {
                write!(f, "Quantity must be between {QUANTITY_MIN} and {QUANTITY_MAX}.")
            }
        }
    }
}

impl Error for BookValidationError {}

/// Catalog record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub quantity: u16,
}

impl Book {
    /// Creates a book from trusted parts. Call [`Book::validate`] before writes.
    pub fn new(
        id: BookId,
        title: impl Into<String>,
        author: impl Into<String>,
        quantity: u16,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            author: author.into(),
            quantity,
        }
    }

    /// Checks every field constraint required before persistence.
    pub fn validate(&self) -> Result<(), BookValidationError> {
        validate_id(self.id)?;
        validate_title(&self.title)?;
        validate_author(&self.author)?;
        if self.quantity > QUANTITY_MAX {
            return Err(BookValidationError::QuantityOutOfRange(
                self.quantity.to_string(),
            ));
        }
        Ok(())
    }

    pub fn display_title(&self) -> String {
        truncate_chars(&self.title, TITLE_DISPLAY_CHARS)
    }

    pub fn display_author(&self) -> String {
        truncate_chars(&self.author, AUTHOR_DISPLAY_CHARS)
    }
}

/// Checks that `id` can be stored and still leaves room for a successor.
pub fn validate_id(id: BookId) -> Result<BookId, BookValidationError> {
    if (1..=BOOK_ID_MAX).contains(&id) {
        Ok(id)
    } else {
        Err(BookValidationError::InvalidId(id))
    }
}

/// Returns the trimmed title or [`BookValidationError::EmptyTitle`].
pub fn validate_title(raw: &str) -> Result<String, BookValidationError> {
    non_empty(raw).ok_or(BookValidationError::EmptyTitle)
}

/// Returns the trimmed author or [`BookValidationError::EmptyAuthor`].
pub fn validate_author(raw: &str) -> Result<String, BookValidationError> {
    non_empty(raw).ok_or(BookValidationError::EmptyAuthor)
}

/// Parses operator quantity input.
///
/// Only plain ASCII digits are numeric, so signs, decimals and whitespace
/// inside the value are rejected as `NotANumber`.
pub fn parse_quantity(raw: &str) -> Result<u16, BookValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(BookValidationError::EmptyQuantity);
    }
    if !DIGITS_RE.is_match(trimmed) {
        return Err(BookValidationError::NotANumber(trimmed.to_string()));
    }

    match trimmed.parse::<u16>() {
        Ok(value) if value <= QUANTITY_MAX => Ok(value),
        _ => Err(BookValidationError::QuantityOutOfRange(trimmed.to_string())),
    }
}

/// Truncates on character boundaries.
pub fn truncate_chars(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}

fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
