//! Error types for habitual-core

use thiserror::Error;

/// Main error type for the habitual-core library
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

    /// Malformed input such as an unparsable date
    #[error("validation error: {0}")]
    Validation(String),

    /// Habit not found
    #[error("habit not found: {0}")]
    HabitNotFound(String),
}

/// Result type alias for habitual-core
pub type Result<T> = std::result::Result<T, Error>;
