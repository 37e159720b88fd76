mod common;

use bookstore_core::{
    open_catalog, reference_seed, Book, BookRepository, BookstoreConfig, CatalogState,
    ConfigError, QueryOutcome, WorkflowOutcome, BOOK_ID_MAX,
};
use common::{empty_catalog, ScriptedConsole};

#[test]
fn fresh_store_is_created_and_seeded_once() {
    let (_dir, service) = empty_catalog();
    let seed = reference_seed();

    assert_eq!(service.bootstrap(&seed), CatalogState::Seeded(5));
    assert_eq!(service.repo().next_id(), 3006);

    assert_eq!(service.bootstrap(&seed), CatalogState::Ready);
    assert_eq!(service.repo().search("").row_count(), 5);
}

#[test]
fn without_fixture_the_catalog_starts_empty() {
    let (_dir, service) = empty_catalog();

    assert_eq!(service.bootstrap(&[]), CatalogState::Seeded(0));
    assert_eq!(service.repo().probe(), QueryOutcome::Empty);
    assert_eq!(service.repo().next_id(), 1);
}

#[test]
fn emptied_catalog_is_not_reseeded_on_restart() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("books.sqlite3");
    let seed = reference_seed();

    let first_run = open_catalog(store.clone());
    assert_eq!(first_run.bootstrap(&seed), CatalogState::Seeded(5));
    for id in 3001..=3005 {
        assert_eq!(first_run.repo().delete(id), QueryOutcome::Success);
    }
    drop(first_run);

    let second_run = open_catalog(store);
    assert_eq!(second_run.bootstrap(&seed), CatalogState::Ready);
    assert_eq!(second_run.repo().probe(), QueryOutcome::Empty);
    assert_eq!(second_run.repo().next_id(), 3006);
}

#[test]
fn restart_after_manual_entries_reports_ready_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("books.sqlite3");

    let first_run = open_catalog(store.clone());
    assert_eq!(first_run.bootstrap(&[]), CatalogState::Seeded(0));
    let book = Book::new(first_run.repo().next_id(), "Dune", "Frank Herbert", 3);
    assert_eq!(first_run.repo().insert(&book), QueryOutcome::Success);
    assert_eq!(first_run.repo().delete(book.id), QueryOutcome::Success);

    let second_run = open_catalog(store);
    assert_eq!(second_run.bootstrap(&reference_seed()), CatalogState::Ready);
    assert_eq!(second_run.repo().search(""), QueryOutcome::Empty);
}

#[test]
fn unreachable_store_reports_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let service = open_catalog(dir.path().join("missing-dir").join("books.sqlite3"));

    assert!(matches!(
        service.bootstrap(&reference_seed()),
        CatalogState::Unavailable(_)
    ));
}

#[test]
fn clashing_fixture_is_rolled_back() {
    let (_dir, service) = empty_catalog();
    let fixture = vec![
        Book::new(7, "First", "Writer", 1),
        Book::new(7, "Second", "Writer", 2),
    ];

    assert!(matches!(
        service.bootstrap(&fixture),
        CatalogState::SeedFailed(_)
    ));
    assert_eq!(service.repo().probe(), QueryOutcome::Empty);
}

#[test]
fn sample_config_file_drives_bootstrap() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("bookstore.toml");
    std::fs::write(
        &config_path,
        r#"
[store]
path = "data.sqlite3"

[[seed]]
id = 3001
title = "A Tale of Two Cities"
author = "Charles Dickens"
quantity = 30
"#,
    )
    .unwrap();

    let config = BookstoreConfig::load(&config_path).unwrap();
    assert_eq!(config.store.path, dir.path().join("data.sqlite3"));

    let service = open_catalog(config.store.path.clone());
    assert_eq!(service.bootstrap(&config.seed), CatalogState::Seeded(1));
    assert!(config.store.path.exists());
    assert_eq!(service.repo().next_id(), 3002);
}

#[test]
fn enter_book_aborts_when_no_id_is_left() {
    let (_dir, service) = empty_catalog();
    let fixture = vec![Book::new(BOOK_ID_MAX, "Last", "Writer", 1)];
    assert_eq!(service.bootstrap(&fixture), CatalogState::Seeded(1));

    let mut console = ScriptedConsole::new(&["Dune", "Frank Herbert", "3"]);
    let outcome = service.enter_book(&mut console);

    assert!(matches!(outcome, WorkflowOutcome::Aborted(message) if message.contains("book id")));
    assert_eq!(console.remaining(), 3);
    assert_eq!(service.repo().search("Dune"), QueryOutcome::Empty);
}

#[test]
fn seed_id_without_a_successor_is_rejected_by_config() {
    let text = format!(
        "[[seed]]\nid = {}\ntitle = \"Max\"\nauthor = \"Id\"\nquantity = 1\n",
        i64::MAX
    );

    assert!(matches!(
        BookstoreConfig::from_toml_str(&text, "/srv/books"),
        Err(ConfigError::InvalidSeed { index: 0, .. })
    ));
}
