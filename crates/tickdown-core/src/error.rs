//! Error types for tickdown-core.
//!
//! The taxonomy mirrors how each failure is recovered: corrupt or
//! missing records fall back to a fresh sentinel record, a rejected
//! wake-up window is retried earlier, and a failed durable write is
//! surfaced as a warning while the in-memory transition stands.

use std::path::PathBuf;
use thiserror::Error;

/// Umbrella error type for tickdown-core.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("scheduling error: {0}")]
    Schedule(#[from] ScheduleError),

    #[error("record error: {0}")]
    Record(#[from] RecordError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Durable key-value store failures.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("cannot prepare data directory: {source}")]
    DataDir {
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("schema migration failed: {source}")]
    MigrationFailed {
        #[source]
        source: rusqlite::Error,
    },

    #[error("read failed for key '{key}': {source}")]
    ReadFailed {
        key: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("write failed for key '{key}': {source}")]
    WriteFailed {
        key: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("no record stored under key '{0}'")]
    Missing(String),

    #[error("query failed: {source}")]
    QueryFailed {
        #[source]
        source: rusqlite::Error,
    },
}

/// External wake-up scheduling failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// The requested time falls inside a window the platform scheduler
    /// refuses to serve. The only retryable failure: the service moves
    /// the request one minute earlier and tries again.
    #[error("requested wake-up time is inside a reserved window")]
    RangeRejected,

    /// The backward retry gave up without finding an open window.
    #[error("no wake-up slot found after {attempts} attempts")]
    RetryBudgetExhausted { attempts: u32 },

    #[error("wake-up backend failure: {0}")]
    Backend(String),
}

/// Persisted record decoding failures. Both variants mean the stored
/// bytes cannot be trusted; the loader replaces them with a fresh
/// sentinel record.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordError {
    /// Stored bytes do not match the fixed record layout. A size
    /// mismatch is corruption, never a partial record.
    #[error("stored record is {found} bytes, expected {expected}")]
    UnexpectedLength { expected: usize, found: usize },

    /// An active deadline must have a scheduled wake-up and vice versa.
    #[error("deadline and wake-up handle disagree about timer activity")]
    InvariantViolated,
}

/// Configuration load/save failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    #[error("failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },
}

/// Result type alias for CoreError.
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
