//! TOML configuration for the store file, logging and seed fixture.
//!
//! # Responsibility
//! - Locate and parse `bookstore.toml`.
//! - Resolve relative paths against the configuration file directory.
//! - Validate the seed fixture before it can reach the store.
//!
//! # Invariants
//! - A missing configuration file yields defaults with an empty seed fixture.
//! - Seed books are valid and have unique ids.
//! - Resolved store and log paths are absolute.

use crate::logging::{default_log_level, normalize_level};
use crate::model::book::{Book, BookId, BookValidationError};
use log::info;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Environment variable overriding the configuration file location.
pub const CONFIG_PATH_ENV: &str = "BOOKSTORE_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "bookstore.toml";
pub const DEFAULT_STORE_FILE: &str = "ebookstore.sqlite3";
pub const DEFAULT_LOG_DIR: &str = "logs";

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        message: String,
    },
    InvalidLogLevel(String),
    InvalidSeed {
        index: usize,
        source: BookValidationError,
    },
    DuplicateSeedId(BookId),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, message } => {
                write!(f, "invalid config `{}`: {message}", path.display())
            }
            Self::InvalidLogLevel(message) => write!(f, "{message}"),
            Self::InvalidSeed { index, source } => {
                write!(f, "invalid seed entry #{index}: {source}")
            }
            Self::DuplicateSeedId(id) => write!(f, "duplicate seed id {id}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::InvalidSeed { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Store file settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_STORE_FILE),
        }
    }
}

/// Rolling file log settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
    pub dir: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            dir: PathBuf::from(DEFAULT_LOG_DIR),
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BookstoreConfig {
    pub store: StoreConfig,
    pub logging: LoggingConfig,
    /// Books inserted while the catalog has never issued an id.
    pub seed: Vec<Book>,
}

impl BookstoreConfig {
    /// Loads the file at `path`, or defaults when it does not exist.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let base_dir = config_base_dir(path)?;

        if !path.exists() {
            info!(
                "event=config_load module=config status=defaults path={}",
                path.display()
            );
            return Self::default().resolved(&base_dir);
        }

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&text, path)?.resolved(&base_dir)?;
        info!(
            "event=config_load module=config status=ok path={} seed_count={}",
            path.display(),
            config.seed.len()
        );
        Ok(config)
    }

    /// Parses TOML text and resolves relative paths against `base_dir`.
    pub fn from_toml_str(text: &str, base_dir: impl AsRef<Path>) -> ConfigResult<Self> {
        Self::parse(text, Path::new("<inline>"))?.resolved(base_dir.as_ref())
    }

    fn parse(text: &str, path: &Path) -> ConfigResult<Self> {
        toml::from_str(text).map_err(|err: toml::de::Error| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    fn resolved(mut self, base_dir: &Path) -> ConfigResult<Self> {
        self.logging.level = normalize_level(&self.logging.level)
            .map_err(ConfigError::InvalidLogLevel)?
            .to_string();
        self.store.path = resolve_path(base_dir, &self.store.path);
        self.logging.dir = resolve_path(base_dir, &self.logging.dir);
        validate_seed(&self.seed)?;
        Ok(self)
    }
}

/// Returns the configuration path from [`CONFIG_PATH_ENV`] or the default file name.
pub fn config_path_from_env() -> PathBuf {
    std::env::var_os(CONFIG_PATH_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// The five reference books shipped in the sample `bookstore.toml`.
pub fn reference_seed() -> Vec<Book> {
    vec![
        Book::new(3001, "A Tale of Two Cities", "Charles Dickens", 30),
        Book::new(
            3002,
            "Harry Potter and the Philosopher's Stone",
            "J.K. Rowling",
            40,
        ),
        Book::new(3003, "The Lion, the Witch and the Wardrobe", "C.S. Lewis", 25),
        Book::new(3004, "The Lord of the Rings", "J.R.R. Tolkien", 37),
        Book::new(3005, "Alice in Wonderland", "Lewis Carroll", 12),
    ]
}

fn validate_seed(seed: &[Book]) -> ConfigResult<()> {
    let mut seen = BTreeSet::new();
    for (index, book) in seed.iter().enumerate() {
        book.validate()
            .map_err(|source| ConfigError::InvalidSeed { index, source })?;
        if !seen.insert(book.id) {
            return Err(ConfigError::DuplicateSeedId(book.id));
        }
    }
    Ok(())
}

fn config_base_dir(path: &Path) -> ConfigResult<PathBuf> {
    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    if parent.is_absolute() {
        return Ok(parent.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(cwd.join(parent))
}

fn resolve_path(base_dir: &Path, value: &Path) -> PathBuf {
    if value.is_absolute() {
        value.to_path_buf()
    } else {
        base_dir.join(value)
    }
}
