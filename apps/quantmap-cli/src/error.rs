//! Error types for the quantmap tool

use quantmap_io::IoError;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Column {0} does not exist; points have columns 0, 1 and 2")]
    InvalidColumn(usize),

    #[error("Column {0} has no finite values")]
    EmptyColumn(usize),

    #[error("Could not partition column {0}: its values span no width")]
    InvalidPartition(usize),

    #[error("A remapping worker panicked")]
    WorkerPanicked,
}

pub type Result<T> = std::result::Result<T, CliError>;
