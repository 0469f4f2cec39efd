//! Observable engine events
//!
//! Every log line carries exactly one of these as its `event` key.

use std::fmt;

/// Observable events in campusdb
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Configuration loaded
    ConfigLoaded,
    /// A store finished loading its file
    StoreLoaded,
    /// All stores loaded
    CatalogOpened,

    // Mutations
    /// Record inserted
    RecordInserted,
    /// Record updated in place
    RecordUpdated,
    /// Record tombstoned
    RecordDeleted,
    /// Mutation rejected before touching state
    MutationRejected,

    // Engine internals
    /// Hash table doubled and rehashed
    TableGrown,
    /// Secondary index is at capacity; record not name-searchable
    SecondaryIndexFull,
    /// Append or rewrite of an entity file failed
    PersistenceFailed,
    /// Referential integrity check blocked an operation
    IntegrityRejected,
    /// Release called with a mode the lock is not held in
    LockMisuse,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::StoreLoaded => "STORE_LOADED",
            Event::CatalogOpened => "CATALOG_OPENED",
            Event::RecordInserted => "RECORD_INSERTED",
            Event::RecordUpdated => "RECORD_UPDATED",
            Event::RecordDeleted => "RECORD_DELETED",
            Event::MutationRejected => "MUTATION_REJECTED",
            Event::TableGrown => "TABLE_GROWN",
            Event::SecondaryIndexFull => "SECONDARY_INDEX_FULL",
            Event::PersistenceFailed => "PERSISTENCE_FAILED",
            Event::IntegrityRejected => "INTEGRITY_REJECTED",
            Event::LockMisuse => "LOCK_MISUSE",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
