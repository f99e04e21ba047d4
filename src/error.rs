//! Error types for the careerscope service.

use thiserror::Error;

/// Main error type for careerscope operations.
#[derive(Error, Debug)]
pub enum CareerscopeError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for careerscope operations.
pub type Result<T> = std::result::Result<T, CareerscopeError>;
