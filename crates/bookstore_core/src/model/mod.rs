//! Catalog domain model.
//!
//! # Responsibility
//! - Define the book record and its field-level validation.
//!
//! # Invariants
//! - Every record is identified by a positive, never reused `BookId`.

pub mod book;
