
use std::path::PathBuf;
use thiserror::Error;

/// Errors that the pipeline surfaces to its caller.
///
/// Source-side storage failures (connectivity, queries) are deliberately
/// absent: the store logs them and degrades to an empty result, so a run
/// continues and simply produces no output. Only the input document and the
/// sink side are fatal.
#[derive(Error, Debug)]
pub enum MergeError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Invalid document {}: {message}", .path.display())]
    Document { path: PathBuf, message: String },
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Merge task failed: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, MergeError>;

// Helper conversions
impl From<rusqlite::Error> for MergeError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

impl From<config::ConfigError> for MergeError {
    fn from(e: config::ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}
