//! Ascending array of live primary keys
//!
//! Mirrors the occupied slots of the hash index exactly. Used for duplicate
//! detection by binary search and for key-ordered iteration.

use super::record::RecordId;

#[derive(Debug, Clone, Default)]
pub struct SortedKeys {
    keys: Vec<RecordId>,
}

impl SortedKeys {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            keys: Vec::with_capacity(capacity),
        }
    }

    pub fn contains(&self, key: RecordId) -> bool {
        self.keys.binary_search(&key).is_ok()
    }

    /// Inserts in sorted position. Returns false if already present.
    pub fn insert(&mut self, key: RecordId) -> bool {
        match self.keys.binary_search(&key) {
            Ok(_) => false,
            Err(pos) => {
                self.keys.insert(pos, key);
                true
            }
        }
    }

    /// Removes and shifts the tail down. Returns false if absent.
    pub fn remove(&mut self, key: RecordId) -> bool {
        match self.keys.binary_search(&key) {
            Ok(pos) => {
                self.keys.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn as_slice(&self) -> &[RecordId] {
        &self.keys
    }

    pub fn last(&self) -> Option<RecordId> {
        self.keys.last().copied()
    }
}
