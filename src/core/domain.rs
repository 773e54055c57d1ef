use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use tracing::warn;

// Identifiable defines common traits that can be shared by persistent objects
pub trait Identifiable : Sync + Send {
    fn id(&self) -> String;
}

pub const DEFAULT_BOOKS_FILE: &str = "books.json";
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_METADATA_URL: &str = "https://www.googleapis.com/books/v1";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

// Configuration abstracts config options for the book catalog
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub(crate) struct Configuration {
    pub books_file: PathBuf,
    pub listen_addr: String,
    pub metadata_url: String,
    pub fetch_timeout_secs: u64,
    pub lambda: bool,
}

impl Configuration {
    pub fn new(books_file: &str) -> Self {
        Configuration {
            books_file: PathBuf::from(books_file),
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            metadata_url: DEFAULT_METADATA_URL.to_string(),
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            lambda: false,
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    // Unset or unparsable values keep their defaults
    pub(crate) fn from_lookup<F>(lookup: F) -> Self where F: Fn(&str) -> Option<String> {
        let mut config = Configuration::new(
            lookup("BOOKSHELF_BOOKS_FILE").unwrap_or(DEFAULT_BOOKS_FILE.to_string()).as_str());
        if let Some(addr) = lookup("BOOKSHELF_LISTEN_ADDR") {
            config.listen_addr = addr;
        }
        if let Some(url) = lookup("BOOKSHELF_METADATA_URL") {
            config.metadata_url = url;
        }
        config.fetch_timeout_secs = parse_or("BOOKSHELF_FETCH_TIMEOUT_SECS",
                                             lookup("BOOKSHELF_FETCH_TIMEOUT_SECS"), DEFAULT_FETCH_TIMEOUT_SECS);
        config.lambda = parse_or("BOOKSHELF_LAMBDA", lookup("BOOKSHELF_LAMBDA"), false);
        config
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

fn parse_or<T: FromStr>(key: &str, value: Option<String>, default: T) -> T {
    match value {
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!(key, value = raw.as_str(), "ignoring invalid configuration value");
                default
            }
        },
        None => default,
    }
}
