//! Error types for tabula

use thiserror::Error;

/// Core error type for tabula operations
#[derive(Error, Debug)]
pub enum TabulaError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Execution error: {0}")]
    Execution(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for tabula operations
pub type Result<T> = std::result::Result<T, TabulaError>;
