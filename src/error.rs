//! Error types.
//!
//! Corrupt persisted state is not represented here: the snapshot store logs it
//! and reads it back as empty.

use std::path::PathBuf;

use thiserror::Error;

/// The inventory source failed or handed back data that cannot be used.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed inventory data in {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("article {code}: {reason}")]
    InvalidArticle { code: String, reason: String },
}

/// A key-value storage backend failed to read or write.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not determine data directory")]
    NoDataDir,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("could not encode snapshot history: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("article code {0} appears more than once")]
    DuplicateCode(String),

    #[error("article {code} has invalid price {price}")]
    InvalidPrice { code: String, price: f64 },
}

/// The requested range cannot be taken from the stored history.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RangeError {
    #[error("snapshot {id} not found in history")]
    UnknownSnapshot { id: i64 },

    #[error("need at least 2 snapshots to compare, history has {have}")]
    NotEnoughHistory { have: usize },

    #[error("no snapshots stored")]
    EmptyHistory,

    #[error("no snapshot captured within the requested window")]
    EmptyWindow,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid duration '{value}': {source}")]
    Duration {
        value: String,
        #[source]
        source: humantime::DurationError,
    },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Range(#[from] RangeError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
