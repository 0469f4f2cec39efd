//! Store error types
//!
//! Error codes:
//! - CAMPUS_VALIDATION_ERROR
//! - CAMPUS_DUPLICATE_KEY
//! - CAMPUS_UNIQUE_VIOLATION
//! - CAMPUS_NOT_FOUND
//! - CAMPUS_REFERENTIAL_INTEGRITY
//! - CAMPUS_STORAGE_FULL
//! - CAMPUS_IO_ERROR / CAMPUS_MALFORMED_RECORD (from persistence)
//!
//! Everything except persistence failures is detected before any state
//! changes. A persistence failure is reported after the in-memory mutation
//! has already been applied.

use std::fmt;

use thiserror::Error;

use super::record::{EntityKind, ForeignKey, RecordId};
use crate::persistence::PersistenceError;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Why a referential integrity check failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityViolation {
    /// The record points at a key that is not live in its owning store
    MissingReference(ForeignKey),
    /// Live records in another store still point at this one
    HasDependents { dependent: EntityKind, count: usize },
}

impl fmt::Display for IntegrityViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityViolation::MissingReference(fk) => {
                write!(f, "references missing {}", fk)
            }
            IntegrityViolation::HasDependents { dependent, count } => {
                write!(f, "still referenced by {} {} record(s)", count, dependent)
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid {kind}: {reason}")]
    Validation { kind: EntityKind, reason: String },

    #[error("{kind} {id} already exists")]
    DuplicateKey { kind: EntityKind, id: RecordId },

    #[error("{kind} {field} '{value}' is already used by {kind} {holder}")]
    UniqueViolation {
        kind: EntityKind,
        field: &'static str,
        value: String,
        holder: RecordId,
    },

    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: RecordId },

    #[error("{kind} {id} {violation}")]
    ReferentialIntegrity {
        kind: EntityKind,
        id: RecordId,
        violation: IntegrityViolation,
    },

    #[error("{kind} table has no free slot (capacity {capacity})")]
    StorageFull { kind: EntityKind, capacity: usize },

    #[error("{kind} file: {source}")]
    Persistence {
        kind: EntityKind,
        #[source]
        source: PersistenceError,
    },
}

impl StoreError {
    pub fn validation(kind: EntityKind, reason: impl Into<String>) -> Self {
        StoreError::Validation {
            kind,
            reason: reason.into(),
        }
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Validation { .. } => "CAMPUS_VALIDATION_ERROR",
            StoreError::DuplicateKey { .. } => "CAMPUS_DUPLICATE_KEY",
            StoreError::UniqueViolation { .. } => "CAMPUS_UNIQUE_VIOLATION",
            StoreError::NotFound { .. } => "CAMPUS_NOT_FOUND",
            StoreError::ReferentialIntegrity { .. } => "CAMPUS_REFERENTIAL_INTEGRITY",
            StoreError::StorageFull { .. } => "CAMPUS_STORAGE_FULL",
            StoreError::Persistence { source, .. } => source.code(),
        }
    }

    /// Kind of the store that reported the error
    pub fn kind(&self) -> EntityKind {
        match self {
            StoreError::Validation { kind, .. }
            | StoreError::DuplicateKey { kind, .. }
            | StoreError::UniqueViolation { kind, .. }
            | StoreError::NotFound { kind, .. }
            | StoreError::ReferentialIntegrity { kind, .. }
            | StoreError::StorageFull { kind, .. }
            | StoreError::Persistence { kind, .. } => *kind,
        }
    }

    /// True when the in-memory mutation was applied but the file was not updated.
    pub fn mutation_applied(&self) -> bool {
        matches!(self, StoreError::Persistence { .. })
    }
}
