//! Interactive menu shell for the bookstore inventory.
//!
//! # Responsibility
//! - Load configuration, start logging and bootstrap the catalog.
//! - Read menu selections from stdin and dispatch them to `bookstore_core`.
//! - Print workflow results; every operation returns control to the menu.

use bookstore_core::{
    config_path_from_env, init_logging, open_catalog, BookstoreConfig, CatalogState, Console,
    WorkflowOutcome,
};
use log::{info, warn};
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

const MAIN_MENU: &str = "
1. Enter Book
2. Update Book
3. Delete Book
4. Search Books
0. Exit";

/// Line console over a reader/writer pair; stdin/stdout in the binary.
struct StdioConsole<R, W> {
    input: R,
    output: W,
}

impl StdioConsole<io::StdinLock<'static>, io::Stdout> {
    fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> StdioConsole<R, W> {
    fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Console for StdioConsole<R, W> {
    fn read_line(&mut self, prompt: &str) -> Option<String> {
        let written = write!(self.output, "{prompt}").and_then(|()| self.output.flush());
        if let Err(err) = written {
            warn!("event=console_write module=cli status=error error={err}");
        }

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line),
            Err(err) => {
                warn!("event=console_read module=cli status=error error={err}");
                None
            }
        }
    }

    fn show_message(&mut self, message: &str) {
        if let Err(err) = writeln!(self.output, "{message}") {
            warn!("event=console_write module=cli status=error error={err}");
        }
    }
}

fn main() -> ExitCode {
    let config_path = config_path_from_env();
    let config = match BookstoreConfig::load(&config_path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = init_logging(&config) {
        eprintln!("warning: file logging disabled: {err}");
    }

    let service = open_catalog(config.store.path.clone());
    match service.bootstrap(&config.seed) {
        CatalogState::Ready => {}
        CatalogState::Seeded(count) if count > 0 => {
            println!("Catalog created with {count} starter books.")
        }
        CatalogState::Seeded(_) => println!("Catalog created."),
        CatalogState::SeedFailed(err) => eprintln!("warning: starter books not added: {err}"),
        CatalogState::Unavailable(err) => {
            eprintln!(
                "warning: catalog at `{}` is unavailable: {err}",
                config.store.path.display()
            )
        }
    }

    let mut console = StdioConsole::stdio();
    loop {
        console.show_message(MAIN_MENU);
        let Some(selection) = console.read_line("> ") else {
            break;
        };

        match selection.trim() {
            "1" => {
                let outcome = service.enter_book(&mut console);
                report(&mut console, "saved", outcome);
            }
            "2" => {
                let outcome = service.update_book(&mut console);
                report(&mut console, "updated", outcome);
            }
            "3" => {
                let outcome = service.delete_book(&mut console);
                report(&mut console, "deleted", outcome);
            }
            "4" => {
                service.search_books(&mut console);
            }
            "0" => {
                console.show_message("Goodbye!");
                break;
            }
            _ => {}
        }
    }

    info!("event=app_exit module=cli status=ok");
    ExitCode::SUCCESS
}

fn report(console: &mut impl Console, verb: &str, outcome: WorkflowOutcome) {
    let message = match outcome {
        WorkflowOutcome::Completed(book) => format!("Book {} {verb}.", book.id),
        WorkflowOutcome::Cancelled => "Cancelled.".to_string(),
        WorkflowOutcome::Aborted(err) => format!("Operation failed: {err}"),
    };
    console.show_message(&message);
}
