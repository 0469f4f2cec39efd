//! Generic record storage for campusdb
//!
//! Every entity kind is held by a `RecordStore<R>`:
//! - `HashIndex`: open-addressed slots keyed by `id mod capacity`
//! - `SortedKeys`: the live primary keys in ascending order
//! - `SecondaryIndex`: bounded sorted (text key, id) pairs
//!
//! All three are guarded together by one `TableLock`. The store knows
//! nothing about other kinds; cross-store checks live in the catalog.

mod errors;
mod hash_index;
mod record;
mod record_store;
mod secondary;
mod sorted_keys;

#[cfg(test)]
pub(crate) mod testing;

pub use errors::{IntegrityViolation, StoreError, StoreResult};
pub use hash_index::{HashIndex, Slot};
pub use record::{EntityKind, ForeignKey, Record, RecordId};
pub use record_store::{InsertMode, RecordStore, StoreConfig, StoreStats};
pub use secondary::SecondaryIndex;
pub use sorted_keys::SortedKeys;
