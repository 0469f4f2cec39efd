//! CLI error types
//!
//! Every CLI error is fatal to the invocation: it is printed as
//! `CODE: message` on stderr and the process exits with status 1.

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::store::{EntityKind, StoreError};

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration file missing, unreadable or invalid
    #[error("{0}")]
    Config(String),

    /// stdout could not be written
    #[error("{0}")]
    Io(String),

    /// A command argument could not be parsed
    #[error("{0}")]
    InvalidArgument(String),

    /// A lookup by id or key found nothing
    #[error("no {kind} matches '{key}'")]
    NoMatch { kind: EntityKind, key: String },

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CliError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        CliError::Config(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        CliError::InvalidArgument(msg.into())
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            CliError::Config(_) => "CAMPUS_CLI_CONFIG_ERROR",
            CliError::Io(_) => "CAMPUS_CLI_IO_ERROR",
            CliError::InvalidArgument(_) => "CAMPUS_CLI_INVALID_ARGUMENT",
            CliError::NoMatch { .. } => "CAMPUS_NOT_FOUND",
            CliError::Catalog(e) => e.code(),
            CliError::Store(e) => e.code(),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Io(format!("JSON error: {}", e))
    }
}
