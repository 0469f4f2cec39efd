//! Persistence error types
//!
//! Error codes:
//! - CAMPUS_IO_ERROR
//! - CAMPUS_MALFORMED_RECORD

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Failure reading or writing an entity file.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to {action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed record at {}:{line}: {reason}", path.display())]
    Malformed {
        path: PathBuf,
        line: usize,
        reason: String,
    },
}

impl PersistenceError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        PersistenceError::Io {
            action,
            path: path.into(),
            source,
        }
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            PersistenceError::Io { .. } => "CAMPUS_IO_ERROR",
            PersistenceError::Malformed { .. } => "CAMPUS_MALFORMED_RECORD",
        }
    }

    /// Path of the file involved
    pub fn path(&self) -> &std::path::Path {
        match self {
            PersistenceError::Io { path, .. } | PersistenceError::Malformed { path, .. } => path,
        }
    }
}
