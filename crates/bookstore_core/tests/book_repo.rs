mod common;

use bookstore_core::{
    decode_books, reference_seed, Book, BookRepository, QueryOutcome, SeedOutcome,
    StatementParams, BOOK_ID_MAX,
};
use common::{empty_catalog, seeded_catalog};
use rusqlite::types::Value;

fn search_books(repo: &impl BookRepository, text: &str) -> Vec<Book> {
    match repo.search(text) {
        QueryOutcome::Rows(rows) => decode_books(&rows).unwrap(),
        QueryOutcome::Empty => Vec::new(),
        other => panic!("unexpected search outcome: {other:?}"),
    }
}

fn ids(books: &[Book]) -> Vec<i64> {
    books.iter().map(|book| book.id).collect()
}

#[test]
fn ensure_schema_twice_is_idempotent() {
    let (_dir, service) = empty_catalog();
    let repo = service.repo();

    assert_eq!(repo.ensure_schema(), QueryOutcome::Success);
    assert_eq!(repo.ensure_schema(), QueryOutcome::Success);

    let tables = repo.executor().execute(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
        StatementParams::Single(vec![Value::Text("books".to_string())]),
    );
    assert_eq!(tables.row_count(), 1);
}

#[test]
fn seeded_catalog_allocates_3006_next() {
    let (_dir, service) = seeded_catalog();
    assert_eq!(service.repo().next_id(), 3006);
}

#[test]
fn search_lewis_matches_author_substrings() {
    let (_dir, service) = seeded_catalog();
    let found = search_books(service.repo(), "Lewis");

    let authors: Vec<&str> = found.iter().map(|book| book.author.as_str()).collect();
    assert_eq!(authors, vec!["C.S. Lewis", "Lewis Carroll"]);
}

#[test]
fn search_is_case_sensitive() {
    let (_dir, service) = seeded_catalog();
    assert_eq!(service.repo().search("lewis"), QueryOutcome::Empty);
    assert_eq!(search_books(service.repo(), "Lord").len(), 1);
}

#[test]
fn empty_search_text_matches_every_book() {
    let (_dir, service) = seeded_catalog();
    let found = search_books(service.repo(), "");
    assert_eq!(ids(&found), vec![3001, 3002, 3003, 3004, 3005]);
}

#[test]
fn search_text_with_sql_metacharacters_is_literal() {
    let (_dir, service) = seeded_catalog();
    let repo = service.repo();

    assert_eq!(repo.search("' OR '1'='1"), QueryOutcome::Empty);
    assert_eq!(repo.search("%"), QueryOutcome::Empty);
    assert_eq!(repo.search("_"), QueryOutcome::Empty);
    assert_eq!(
        search_books(repo, "Philosopher's").first().map(|book| book.id),
        Some(3002)
    );
}

#[test]
fn inserted_book_is_found_by_id_title_and_author() {
    let (_dir, service) = seeded_catalog();
    let repo = service.repo();
    let id = repo.next_id();
    let book = Book::new(id, "Middlemarch", "George Eliot", 7);

    assert_eq!(repo.insert(&book), QueryOutcome::Success);

    assert_eq!(search_books(repo, &id.to_string()), vec![book.clone()]);
    assert_eq!(search_books(repo, "Middlemarch"), vec![book.clone()]);
    assert_eq!(search_books(repo, "George Eliot"), vec![book]);
}

#[test]
fn next_id_stays_above_every_present_id() {
    let (_dir, service) = seeded_catalog();
    let repo = service.repo();

    for (title, quantity) in [("One", 1), ("Two", 2), ("Three", 3)] {
        let book = Book::new(repo.next_id(), title, "Author", quantity);
        assert_eq!(repo.insert(&book), QueryOutcome::Success);

        let next = repo.next_id();
        let present = ids(&search_books(repo, ""));
        assert!(present.iter().all(|id| *id < next));
    }

    let far = Book::new(9000, "Far", "Away", 1);
    assert_eq!(repo.insert(&far), QueryOutcome::Success);
    assert_eq!(repo.next_id(), 9001);
}

#[test]
fn next_id_is_not_reissued_after_deleting_highest() {
    let (_dir, service) = seeded_catalog();
    let repo = service.repo();
    let book = Book::new(repo.next_id(), "Ephemeral", "Nobody", 1);
    repo.insert(&book);

    assert_eq!(repo.delete(book.id), QueryOutcome::Success);
    assert_eq!(repo.next_id(), book.id + 1);
}

#[test]
fn next_id_defaults_to_one() {
    let (_dir, service) = empty_catalog();
    assert_eq!(service.repo().next_id(), 1);

    service.repo().ensure_schema();
    assert_eq!(service.repo().next_id(), 1);
}

#[test]
fn update_and_delete_of_missing_id_succeed_without_changes() {
    let (_dir, service) = seeded_catalog();
    let repo = service.repo();
    let before = search_books(repo, "");

    assert_eq!(
        repo.update(&Book::new(4242, "Ghost", "Nobody", 1)),
        QueryOutcome::Success
    );
    assert_eq!(repo.delete(4242), QueryOutcome::Success);

    assert_eq!(search_books(repo, ""), before);
}

#[test]
fn update_rewrites_fields_but_keeps_id() {
    let (_dir, service) = seeded_catalog();
    let repo = service.repo();
    let edited = Book::new(3004, "The Hobbit", "J.R.R. Tolkien", 11);

    assert_eq!(repo.update(&edited), QueryOutcome::Success);
    assert_eq!(search_books(repo, "3004"), vec![edited]);
    assert_eq!(repo.search("The Lord of the Rings"), QueryOutcome::Empty);
}

#[test]
fn invalid_book_is_rejected_before_the_store() {
    let (_dir, service) = seeded_catalog();
    let repo = service.repo();

    assert!(repo.insert(&Book::new(3006, "", "Someone", 1)).is_failure());
    assert!(repo.insert(&Book::new(3006, "Title", "Someone", 10_000)).is_failure());
    assert!(repo
        .update(&Book::new(3001, "A Tale of Two Cities", " ", 30))
        .is_failure());

    assert_eq!(repo.search("3006"), QueryOutcome::Empty);
    assert_eq!(search_books(repo, "3001")[0].author, "Charles Dickens");
}

#[test]
fn duplicate_id_insert_is_a_failure() {
    let (_dir, service) = seeded_catalog();
    let outcome = service
        .repo()
        .insert(&Book::new(3001, "Copy", "Somebody", 1));
    assert!(matches!(outcome, QueryOutcome::Failure(message) if message.contains("UNIQUE")));
}

#[test]
fn seed_if_empty_skips_populated_catalog() {
    let (_dir, service) = seeded_catalog();
    let repo = service.repo();

    let extra = vec![Book::new(1, "Extra", "Writer", 1)];
    assert_eq!(repo.seed_if_empty(&extra), SeedOutcome::Skipped);
    assert_eq!(repo.search("Extra"), QueryOutcome::Empty);
    assert_eq!(search_books(repo, "").len(), reference_seed().len());
}

#[test]
fn failed_seed_batch_leaves_no_rows() {
    let (_dir, service) = empty_catalog();
    let repo = service.repo();
    repo.ensure_schema();

    let clashing = vec![
        Book::new(1, "First", "Writer", 1),
        Book::new(1, "Second", "Writer", 2),
    ];
    assert!(matches!(
        repo.seed_if_empty(&clashing),
        SeedOutcome::Failed(_)
    ));
    assert_eq!(repo.probe(), QueryOutcome::Empty);
    assert_eq!(
        repo.seed_if_empty(&[Book::new(1, "First", "Writer", 1)]),
        SeedOutcome::Inserted(1)
    );
}

#[test]
fn seed_if_empty_skips_catalog_emptied_by_deletes() {
    let (_dir, service) = seeded_catalog();
    let repo = service.repo();
    for id in 3001..=3005 {
        assert_eq!(repo.delete(id), QueryOutcome::Success);
    }
    assert_eq!(repo.probe(), QueryOutcome::Empty);

    assert_eq!(repo.seed_if_empty(&reference_seed()), SeedOutcome::Skipped);
    assert_eq!(repo.search(""), QueryOutcome::Empty);
    assert_eq!(repo.next_id(), 3006);
}

#[test]
fn next_id_at_the_top_of_the_id_range_does_not_overflow() {
    let (_dir, service) = empty_catalog();
    let repo = service.repo();
    repo.ensure_schema();

    assert_eq!(
        repo.insert(&Book::new(BOOK_ID_MAX, "Last", "Writer", 1)),
        QueryOutcome::Success
    );
    assert_eq!(repo.next_id(), i64::MAX);
    assert!(repo.insert(&Book::new(i64::MAX, "Past", "Writer", 1)).is_failure());
    assert_eq!(repo.search("Past"), QueryOutcome::Empty);
}

#[test]
fn next_id_saturates_when_the_store_already_holds_the_largest_id() {
    let (_dir, service) = empty_catalog();
    let repo = service.repo();
    repo.ensure_schema();

    let executor = repo.executor();
    assert_eq!(
        executor.execute("DROP TABLE books;", StatementParams::None),
        QueryOutcome::Success
    );
    assert_eq!(
        executor.execute(
            "CREATE TABLE books (id INTEGER PRIMARY KEY, title TEXT, author TEXT, quantity INTEGER);",
            StatementParams::None,
        ),
        QueryOutcome::Success
    );
    assert_eq!(
        executor.execute(
            "INSERT INTO books (id, title, author, quantity) VALUES (?1, 'Max', 'Id', 1);",
            StatementParams::Single(vec![Value::Integer(i64::MAX)]),
        ),
        QueryOutcome::Success
    );

    assert_eq!(repo.next_id(), i64::MAX);
}
