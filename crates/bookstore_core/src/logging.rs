//! Rolling file logs for one bookstore session.
//!
//! # Responsibility
//! - Start the `flexi_logger` file sink from the `[logging]` configuration.
//! - Record which store and seed fixture the session runs against.
//!
//! # Invariants
//! - The sink starts at most once per process; later calls must ask for the
//!   same level and directory.
//! - Events are `key=value` lines and never carry book titles or authors.

use crate::config::BookstoreConfig;
use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "bookstore";
const ROTATE_AT_BYTES: u64 = 4 * 1024 * 1024;
const KEEP_ROTATED_FILES: usize = 3;
const PANIC_SUMMARY_CHARS: usize = 120;

static SESSION_LOG: OnceCell<SessionLog> = OnceCell::new();

struct SessionLog {
    level: &'static str,
    dir: PathBuf,
    _handle: LoggerHandle,
}

impl SessionLog {
    fn start(level: &'static str, dir: &Path) -> Result<Self, String> {
        std::fs::create_dir_all(dir)
            .map_err(|err| format!("cannot create log directory `{}`: {err}", dir.display()))?;

        let handle = Logger::try_with_str(level)
            .map_err(|err| format!("invalid log level `{level}`: {err}"))?
            .log_to_file(FileSpec::default().directory(dir).basename(LOG_FILE_BASENAME))
            .rotate(
                Criterion::Size(ROTATE_AT_BYTES),
                Naming::Numbers,
                Cleanup::KeepLogFiles(KEEP_ROTATED_FILES),
            )
            .write_mode(WriteMode::BufferAndFlush)
            .append()
            .format_for_files(flexi_logger::detailed_format)
            .start()
            .map_err(|err| format!("cannot start file logger: {err}"))?;

        Ok(Self {
            level,
            dir: dir.to_path_buf(),
            _handle: handle,
        })
    }

    fn matches(&self, level: &str, dir: &Path) -> Result<(), String> {
        if self.dir != dir {
            return Err(format!(
                "logging already writes to `{}`, not `{}`",
                self.dir.display(),
                dir.display()
            ));
        }
        if self.level != level {
            return Err(format!(
                "logging already runs at `{}`, not `{level}`",
                self.level
            ));
        }
        Ok(())
    }
}

/// Starts file logging for `config` and records the session header.
///
/// A second call with the same level and directory is a no-op.
///
/// # Errors
/// - The level is not one of `trace|debug|info|warn|error`.
/// - The directory is relative or cannot be created.
/// - Logging was already started with another level or directory.
pub fn init_logging(config: &BookstoreConfig) -> Result<(), String> {
    let level = normalize_level(&config.logging.level)?;
    let dir = normalize_log_dir(&config.logging.dir)?;

    let session = SESSION_LOG.get_or_try_init(|| {
        let session = SessionLog::start(level, &dir)?;
        install_panic_logger();
        log_session_header(config, level, &dir);
        Ok::<_, String>(session)
    })?;
    session.matches(level, &dir)
}

/// `debug` for debug builds, `info` otherwise.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

pub(crate) fn normalize_level(level: &str) -> Result<&'static str, String> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(format!(
            "unsupported log level `{other}`; expected trace|debug|info|warn|error"
        )),
    }
}

fn normalize_log_dir(dir: &Path) -> Result<PathBuf, String> {
    if dir.as_os_str().is_empty() || !dir.is_absolute() {
        return Err(format!(
            "log directory must be an absolute path, got `{}`",
            dir.display()
        ));
    }
    Ok(dir.to_path_buf())
}

fn log_session_header(config: &BookstoreConfig, level: &str, dir: &Path) {
    info!(
        "event=app_start module=core status=ok version={} platform={} store={}",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        config.store.path.display()
    );
    info!(
        "event=core_init module=core status=ok level={level} log_dir={} seed_count={}",
        dir.display(),
        config.seed.len()
    );
}

fn install_panic_logger() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .map(|message| message.to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_default();
        error!(
            "event=panic_captured module=core status=error location={location} payload={}",
            one_line(&payload, PANIC_SUMMARY_CHARS)
        );
        previous(info);
    }));
}

// Panic payloads may echo operator input.
fn one_line(value: &str, max_chars: usize) -> String {
    let mut line: String = value
        .chars()
        .map(|ch| if ch == '\n' || ch == '\r' { ' ' } else { ch })
        .take(max_chars)
        .collect();
    if value.chars().count() > max_chars {
        line.push_str("...");
    }
    line
}
