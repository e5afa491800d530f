//! Errors raised while loading source files into the warehouse.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    /// The warehouse database could not be opened.
    #[error("Cannot connect to warehouse database {path:?}: {source}")]
    Connection {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// A statement failed after the connection was established.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Cannot read {path:?}: {source}")]
    UnreadableFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed catalog record in {path:?}: {reason}")]
    MalformedCatalogRecord { path: PathBuf, reason: String },

    #[error("Malformed event log {path:?}: {reason}")]
    MalformedEventLog { path: PathBuf, reason: String },

    #[error("Malformed event record #{index}: {reason}")]
    MalformedEventRecord { index: usize, reason: String },
}

impl LoadError {
    /// Whether the error only invalidates the file being loaded.
    ///
    /// File-level errors roll back that file and the run moves on; anything
    /// else aborts the run.
    pub fn is_file_level(&self) -> bool {
        matches!(
            self,
            LoadError::UnreadableFile { .. }
                | LoadError::MalformedCatalogRecord { .. }
                | LoadError::MalformedEventLog { .. }
        )
    }
}
