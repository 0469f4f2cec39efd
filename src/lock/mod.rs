//! Concurrency control for campusdb
//!
//! One `TableLock` per entity kind guards that kind's whole table and file.
//! There is no row-level locking.

mod table_lock;

pub use table_lock::{LockMode, LockState, ReadGuard, TableLock, WriteGuard};
