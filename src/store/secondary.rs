//! Bounded name/title index
//!
//! Sorted `(text key, primary key)` pairs. The array never grows past its
//! limit: once full, newly inserted records are simply not indexed here and
//! stay reachable by primary key only. Freed room is used by later inserts.

use super::record::RecordId;

#[derive(Debug, Clone)]
pub struct SecondaryIndex {
    entries: Vec<(String, RecordId)>,
    limit: usize,
}

impl SecondaryIndex {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Vec::with_capacity(limit.min(1024)),
            limit,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.limit
    }

    /// Adds a pair in sorted position. Returns false when the index is full.
    pub fn insert(&mut self, key: String, id: RecordId) -> bool {
        if self.is_full() {
            return false;
        }
        let pos = self
            .entries
            .partition_point(|(k, i)| (k.as_str(), *i) < (key.as_str(), id));
        self.entries.insert(pos, (key, id));
        true
    }

    /// Drops the entry for `id`, if it was indexed.
    pub fn remove_id(&mut self, id: RecordId) -> bool {
        match self.entries.iter().position(|(_, i)| *i == id) {
            Some(pos) => {
                self.entries.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Lowest primary key indexed under `key`.
    pub fn find(&self, key: &str) -> Option<RecordId> {
        let pos = self.entries.partition_point(|(k, _)| k.as_str() < key);
        self.entries
            .get(pos)
            .filter(|(k, _)| k == key)
            .map(|(_, id)| *id)
    }

    #[cfg(test)]
    pub(crate) fn entries(&self) -> &[(String, RecordId)] {
        &self.entries
    }
}
