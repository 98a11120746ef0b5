//! Error types for quantmap-io

use thiserror::Error;

/// Errors that can occur while reading or writing point files
#[derive(Debug, Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Failed to open file: {0}")]
    OpenFailed(String),

    #[error("Failed to write file: {0}")]
    WriteFailed(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for I/O operations
pub type IoResult<T> = Result<T, IoError>;
