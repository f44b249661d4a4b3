//! Error types for daybook-core

use thiserror::Error;

/// Main error type for the daybook-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Value store error from an external collaborator
    #[error("store error: {0}")]
    Store(String),
}

/// Result type alias for daybook-core
pub type Result<T> = std::result::Result<T, Error>;
