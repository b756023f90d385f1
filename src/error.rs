//! Error types for stash.

use thiserror::Error;

/// Common error type for stash operations.
#[derive(Error, Debug)]
pub enum StashError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Name collision on upload or rename.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Authentication error.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Metadata store error (unreadable or unwritable backing file).
    #[error("metadata store error: {0}")]
    Store(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for stash operations.
pub type Result<T> = std::result::Result<T, StashError>;
