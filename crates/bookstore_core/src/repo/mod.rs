//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define catalog data access contracts.
//! - Isolate SQL text and parameter binding from workflow orchestration.
//!
//! # Invariants
//! - Repository writes enforce `Book::validate()` before persistence.
//! - The only store error surfaced upward is `QueryOutcome::Failure`.

pub mod book_repo;
