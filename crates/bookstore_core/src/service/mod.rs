//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into operator-facing interactions.
//! - Keep the menu shell decoupled from storage details.

pub mod book_service;
pub mod mutation_workflow;
