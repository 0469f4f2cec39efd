//! Open-addressed primary index
//!
//! Keys hash to `key mod capacity`; collisions probe forward one slot at a
//! time with wraparound. Deleted slots become tombstones so later probes keep
//! walking past them; an insert may reuse the first tombstone it meets.
//! Growth doubles the slot count and rehashes live records only.

use std::mem;

use super::record::{Record, RecordId};

/// One cell of the table.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot<R> {
    Empty,
    Tombstone,
    Occupied(R),
}

impl<R> Slot<R> {
    pub fn is_free(&self) -> bool {
        !matches!(self, Slot::Occupied(_))
    }
}

#[derive(Debug, Clone)]
pub struct HashIndex<R> {
    slots: Vec<Slot<R>>,
}

impl<R: Record> HashIndex<R> {
    /// Creates a table of `capacity` empty slots (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: empty_slots(capacity.max(1)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn home(&self, key: RecordId) -> usize {
        key as usize % self.slots.len()
    }

    /// Slot positions in probe order for `key`, each visited once.
    fn probe(&self, key: RecordId) -> impl Iterator<Item = usize> {
        let capacity = self.slots.len();
        let start = self.home(key);
        (0..capacity).map(move |step| (start + step) % capacity)
    }

    /// Position of the live record with `key`.
    ///
    /// Tombstones are walked past; an empty slot ends the search.
    pub fn find(&self, key: RecordId) -> Option<usize> {
        for index in self.probe(key) {
            match &self.slots[index] {
                Slot::Empty => return None,
                Slot::Tombstone => continue,
                Slot::Occupied(record) if record.id() == key => return Some(index),
                Slot::Occupied(_) => continue,
            }
        }
        None
    }

    pub fn get(&self, key: RecordId) -> Option<&R> {
        self.find(key).and_then(|index| match &self.slots[index] {
            Slot::Occupied(record) => Some(record),
            _ => None,
        })
    }

    pub fn get_mut(&mut self, key: RecordId) -> Option<&mut R> {
        let index = self.find(key)?;
        match &mut self.slots[index] {
            Slot::Occupied(record) => Some(record),
            _ => None,
        }
    }

    /// First empty or tombstoned slot on `key`'s probe path.
    ///
    /// `None` means the probe wrapped all the way around.
    pub fn free_slot_for(&self, key: RecordId) -> Option<usize> {
        self.probe(key).find(|&index| self.slots[index].is_free())
    }

    /// Stores `record` at `index`, which must come from `free_slot_for`.
    pub fn place(&mut self, index: usize, record: R) {
        debug_assert!(self.slots[index].is_free(), "slot {} is occupied", index);
        self.slots[index] = Slot::Occupied(record);
    }

    /// Tombstones the live record with `key` and hands it back.
    pub fn remove(&mut self, key: RecordId) -> Option<R> {
        let index = self.find(key)?;
        match mem::replace(&mut self.slots[index], Slot::Tombstone) {
            Slot::Occupied(record) => Some(record),
            other => {
                self.slots[index] = other;
                None
            }
        }
    }

    /// Doubles capacity and rehashes every live record. Tombstones are dropped.
    pub fn grow(&mut self) {
        let new_capacity = self.slots.len() * 2;
        let old = mem::replace(&mut self.slots, empty_slots(new_capacity));

        for slot in old {
            if let Slot::Occupied(record) = slot {
                let mut index = record.id() as usize % new_capacity;
                while !matches!(self.slots[index], Slot::Empty) {
                    index = (index + 1) % new_capacity;
                }
                self.slots[index] = Slot::Occupied(record);
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn occupied(&self) -> impl Iterator<Item = &R> {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Occupied(record) => Some(record),
            _ => None,
        })
    }

    pub fn tombstones(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| matches!(slot, Slot::Tombstone))
            .count()
    }

    #[cfg(test)]
    pub(crate) fn slot(&self, index: usize) -> &Slot<R> {
        &self.slots[index]
    }
}

fn empty_slots<R>(capacity: usize) -> Vec<Slot<R>> {
    (0..capacity).map(|_| Slot::Empty).collect()
}
