//! Error types for the roster pipeline

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a normalization run
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("unreadable workbook: {0}")]
    UnreadableWorkbook(String),
    #[error("failed to write {}: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

/// Errors that abort a roster import
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("unreadable workbook: {0}")]
    UnreadableWorkbook(String),
    #[error("workbook is missing required column: {0}")]
    MissingRequiredColumn(String),
    #[error("import rolled back: {0}")]
    SinkWriteFailure(#[from] SinkError),
}

impl From<NormalizeError> for ImportError {
    fn from(err: NormalizeError) -> Self {
        match err {
            NormalizeError::UnreadableWorkbook(msg) => ImportError::UnreadableWorkbook(msg),
            other => ImportError::UnreadableWorkbook(other.to_string()),
        }
    }
}

/// Failure reported by a student store
#[derive(Debug, Error)]
pub enum SinkError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error("{0}")]
    Rejected(String),
}
