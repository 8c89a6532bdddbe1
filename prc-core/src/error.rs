//! Error types for gh-comment

use thiserror::Error;

/// Result type alias for gh-comment operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for gh-comment operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Batch file could not be parsed
    #[error(transparent)]
    Parse(#[from] crate::batch::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Git repository error
    #[error("Git error: {0}")]
    Git(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}
