//! Common error types for CodyStats

use thiserror::Error;

/// Common result type for CodyStats operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the CodyStats tools
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Upstream HTTP request failure
    #[error("HTTP error: {0}")]
    Http(String),

    /// Payload or field value could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
