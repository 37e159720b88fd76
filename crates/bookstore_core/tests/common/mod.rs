#![allow(dead_code)]

use bookstore_core::{open_catalog, reference_seed, BookService, Console, SqliteBookRepository};
use std::collections::VecDeque;
use tempfile::TempDir;

/// Console double that replays fixed replies and records everything shown.
pub struct ScriptedConsole {
    replies: VecDeque<String>,
    pub prompts: Vec<String>,
    pub messages: Vec<String>,
}

impl ScriptedConsole {
    pub fn new(replies: &[&str]) -> Self {
        Self {
            replies: replies.iter().map(|reply| reply.to_string()).collect(),
            prompts: Vec::new(),
            messages: Vec::new(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.replies.len()
    }

    pub fn saw(&self, message: &str) -> bool {
        self.messages.iter().any(|shown| shown == message)
    }

    pub fn count(&self, message: &str) -> usize {
        self.messages.iter().filter(|shown| *shown == message).count()
    }
}

impl Console for ScriptedConsole {
    fn read_line(&mut self, prompt: &str) -> Option<String> {
        self.prompts.push(prompt.to_string());
        self.replies.pop_front()
    }

    fn show_message(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}

/// Fresh store file in a temp dir, bootstrapped with the reference books.
pub fn seeded_catalog() -> (TempDir, BookService<SqliteBookRepository>) {
    let dir = tempfile::tempdir().unwrap();
    let service = open_catalog(dir.path().join("books.sqlite3"));
    service.bootstrap(&reference_seed());
    (dir, service)
}

/// Fresh store file in a temp dir without schema.
pub fn empty_catalog() -> (TempDir, BookService<SqliteBookRepository>) {
    let dir = tempfile::tempdir().unwrap();
    let service = open_catalog(dir.path().join("books.sqlite3"));
    (dir, service)
}
