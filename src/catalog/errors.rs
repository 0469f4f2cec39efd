//! Catalog error types
//!
//! Error codes:
//! - CAMPUS_IO_ERROR (data directory)
//! - every `StoreError` code, passed through

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::store::StoreError;

/// Result type for catalog operations that can fail before any store exists
pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("cannot create data directory {}: {source}", path.display())]
    DataDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CatalogError {
    pub fn code(&self) -> &'static str {
        match self {
            CatalogError::DataDir { .. } => "CAMPUS_IO_ERROR",
            CatalogError::Store(e) => e.code(),
        }
    }
}
