//! RecordStore for campusdb
//!
//! One store per entity kind. Composes the hash index, the sorted key array
//! and the bounded secondary index behind a single `TableLock`, and owns the
//! kind's backing file.
//!
//! # API
//!
//! - `open(dir, config, metrics)` - Create the store and load its file
//! - `insert(record, mode)` - Insert; Live mode validates and appends
//! - `update(id, mutate)` - Mutate a copy, validate, swap in, rewrite file
//! - `delete_checked(id, check)` - Run `check` under the exclusive hold, then tombstone
//! - `get(id)` / `find_by_secondary(key)` / `filter(pred)` - Shared-lock lookups
//! - `render_all(f)` - One scoped thread per live record
//!
//! Every mutation runs under one Exclusive hold, including its file write.
//! Every lookup takes the Shared lock.

use std::path::Path;
use std::sync::Arc;
use std::thread;

use serde::Serialize;

use super::errors::{StoreError, StoreResult};
use super::hash_index::HashIndex;
use super::record::{EntityKind, ForeignKey, Record, RecordId};
use super::secondary::SecondaryIndex;
use super::sorted_keys::SortedKeys;
use crate::lock::{LockState, TableLock};
use crate::observability::{Event, Logger, MetricsRegistry};
use crate::persistence::LineFile;

/// Where an insert comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertMode {
    /// Replayed from the entity file at startup: no validation, no append
    Load,
    /// A new mutation: validated and appended to the file
    Live,
}

/// Sizing for a new store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Slots allocated before the first growth
    pub initial_capacity: usize,
    /// Upper bound on secondary index entries
    pub secondary_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 100,
            secondary_capacity: 100,
        }
    }
}

/// Point-in-time view of a store's shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub kind: EntityKind,
    pub live: usize,
    pub capacity: usize,
    pub tombstones: usize,
    pub secondary_entries: usize,
    pub secondary_limit: usize,
}

struct Table<R> {
    slots: HashIndex<R>,
    keys: SortedKeys,
    secondary: SecondaryIndex,
}

impl<R: Record> Table<R> {
    fn new(config: StoreConfig) -> Self {
        Self {
            slots: HashIndex::with_capacity(config.initial_capacity),
            keys: SortedKeys::with_capacity(config.initial_capacity),
            secondary: SecondaryIndex::new(config.secondary_capacity),
        }
    }

    /// Live records in primary key order.
    fn ordered(&self) -> impl Iterator<Item = &R> {
        self.keys
            .as_slice()
            .iter()
            .filter_map(move |&id| self.slots.get(id))
    }
}

/// Storage for one entity kind.
pub struct RecordStore<R: Record> {
    table: TableLock<Table<R>>,
    file: LineFile,
    metrics: Arc<MetricsRegistry>,
}

impl<R: Record> RecordStore<R> {
    /// Creates an empty store backed by `<dir>/<kind file name>`.
    ///
    /// Nothing is read until `load_from_file` is called.
    pub fn new(dir: &Path, config: StoreConfig, metrics: Arc<MetricsRegistry>) -> Self {
        Self {
            table: TableLock::new(R::KIND.as_str(), Table::new(config)),
            file: LineFile::new(dir, R::KIND.file_name()),
            metrics,
        }
    }

    /// Creates the store and loads its file.
    pub fn open(dir: &Path, config: StoreConfig, metrics: Arc<MetricsRegistry>) -> StoreResult<Self> {
        let store = Self::new(dir, config, metrics);
        store.load_from_file()?;
        Ok(store)
    }

    /// Inserts every record in the entity file with `InsertMode::Load`.
    ///
    /// A repeated id keeps the first occurrence; later copies are skipped
    /// with a warning. Returns the number of records loaded.
    pub fn load_from_file(&self) -> StoreResult<usize> {
        let records: Vec<R> = self.file.load().map_err(|source| StoreError::Persistence {
            kind: R::KIND,
            source,
        })?;

        let mut table = self.table.write();
        let mut loaded = 0;
        for record in records {
            let id = record.id();
            match self.insert_locked(&mut table, record, InsertMode::Load) {
                Ok(()) => loaded += 1,
                Err(StoreError::DuplicateKey { .. }) => {
                    Logger::warn(
                        Event::MutationRejected,
                        &[
                            ("kind", R::KIND.as_str()),
                            ("id", &id.to_string()),
                            ("reason", "duplicate id in file, skipped"),
                        ],
                    );
                }
                Err(e) => return Err(e),
            }
        }
        drop(table);

        Logger::info(
            Event::StoreLoaded,
            &[
                ("kind", R::KIND.as_str()),
                ("path", &self.file.path().display().to_string()),
                ("records", &loaded.to_string()),
            ],
        );
        Ok(loaded)
    }

    /// Inserts one record.
    ///
    /// Validation, duplicate and StorageFull failures leave the store
    /// unchanged. A failed append in Live mode is reported as
    /// `StoreError::Persistence` with the record already in memory.
    pub fn insert(&self, record: R, mode: InsertMode) -> StoreResult<()> {
        let mut table = self.table.write();
        self.insert_locked(&mut table, record, mode)
            .map_err(|e| self.rejected(e))
    }

    /// Builds a record from the next free id and inserts it, all under one
    /// exclusive hold.
    ///
    /// `build` receives `max(live ids) + 1` and the live records in id order,
    /// so per-owner caps and id assignment cannot race other inserts. Fails
    /// with a validation error when the largest id is already `RecordId::MAX`.
    pub fn insert_next<F>(&self, build: F) -> StoreResult<R>
    where
        F: FnOnce(RecordId, &[&R]) -> StoreResult<R>,
    {
        let mut table = self.table.write();
        let next_id = match table.keys.last() {
            None => 1,
            Some(max) => max.checked_add(1).ok_or_else(|| {
                self.rejected(StoreError::validation(
                    R::KIND,
                    format!("no id left after {}", max),
                ))
            })?,
        };
        let built = {
            let live: Vec<&R> = table.ordered().collect();
            build(next_id, &live)
        };
        let record = built.map_err(|e| self.rejected(e))?;
        self.insert_locked(&mut table, record.clone(), InsertMode::Live)
            .map_err(|e| self.rejected(e))?;
        Ok(record)
    }

    fn insert_locked(&self, table: &mut Table<R>, record: R, mode: InsertMode) -> StoreResult<()> {
        let id = record.id();

        if mode == InsertMode::Live {
            record
                .validate()
                .map_err(|reason| StoreError::validation(R::KIND, reason))?;
        }

        if table.keys.contains(id) {
            return Err(StoreError::DuplicateKey { kind: R::KIND, id });
        }

        if mode == InsertMode::Live {
            Self::ensure_unique(table, &record)?;
        }

        // Load factor may not pass 0.75 once this record is in.
        if (table.keys.len() + 1) * 4 > table.slots.capacity() * 3 {
            let from = table.slots.capacity();
            table.slots.grow();
            self.metrics.increment_growth_events();
            Logger::info(
                Event::TableGrown,
                &[
                    ("kind", R::KIND.as_str()),
                    ("from", &from.to_string()),
                    ("to", &table.slots.capacity().to_string()),
                ],
            );
        }

        let slot = table.slots.free_slot_for(id).ok_or(StoreError::StorageFull {
            kind: R::KIND,
            capacity: table.slots.capacity(),
        })?;

        table.keys.insert(id);
        let secondary_key = record.secondary_key();
        let appended = match mode {
            InsertMode::Live => Some(self.file.append(&record)),
            InsertMode::Load => None,
        };
        table.slots.place(slot, record);

        if let Some(key) = secondary_key {
            if !table.secondary.insert(key, id) {
                Logger::warn(
                    Event::SecondaryIndexFull,
                    &[
                        ("kind", R::KIND.as_str()),
                        ("id", &id.to_string()),
                        ("limit", &table.secondary.limit().to_string()),
                    ],
                );
            }
        }

        match appended {
            None => {
                self.metrics.increment_loaded();
                Ok(())
            }
            Some(result) => {
                self.metrics.increment_inserts();
                Logger::trace(
                    Event::RecordInserted,
                    &[("kind", R::KIND.as_str()), ("id", &id.to_string())],
                );
                result.map_err(|source| self.persistence_failed(source))
            }
        }
    }

    /// Applies `mutate` to a copy of record `id` and swaps it in.
    ///
    /// The primary key may not change. The copy is validated before anything
    /// is touched; the secondary entry moves if its key changed. Returns the
    /// updated record.
    pub fn update<F>(&self, id: RecordId, mutate: F) -> StoreResult<R>
    where
        F: FnOnce(&mut R),
    {
        let mut table = self.table.write();
        self.update_locked(&mut table, id, mutate)
            .map_err(|e| self.rejected(e))
    }

    fn update_locked<F>(&self, table: &mut Table<R>, id: RecordId, mutate: F) -> StoreResult<R>
    where
        F: FnOnce(&mut R),
    {
        let current = table
            .slots
            .get(id)
            .ok_or(StoreError::NotFound { kind: R::KIND, id })?;

        let mut updated = current.clone();
        mutate(&mut updated);
        if updated.id() != id {
            return Err(StoreError::validation(R::KIND, "primary key cannot change"));
        }
        updated
            .validate()
            .map_err(|reason| StoreError::validation(R::KIND, reason))?;
        Self::ensure_unique(table, &updated)?;

        let old_key = current.secondary_key();
        let new_key = updated.secondary_key();
        if old_key != new_key {
            table.secondary.remove_id(id);
            if let Some(key) = new_key {
                if !table.secondary.insert(key, id) {
                    Logger::warn(
                        Event::SecondaryIndexFull,
                        &[("kind", R::KIND.as_str()), ("id", &id.to_string())],
                    );
                }
            }
        }

        if let Some(slot) = table.slots.get_mut(id) {
            *slot = updated.clone();
        }
        self.metrics.increment_updates();
        Logger::trace(
            Event::RecordUpdated,
            &[("kind", R::KIND.as_str()), ("id", &id.to_string())],
        );

        self.file
            .rewrite(|record: R| {
                if record.id() == id {
                    Some(updated.clone())
                } else {
                    Some(record)
                }
            })
            .map_err(|source| self.persistence_failed(source))?;
        Ok(updated)
    }

    /// Deletes record `id` with no dependent check.
    pub fn delete(&self, id: RecordId) -> StoreResult<R> {
        self.delete_checked(id, |_| Ok(()))
    }

    /// Deletes record `id` once `check` accepts it.
    ///
    /// `check` runs while this store's Exclusive lock is held, so no insert
    /// into this store can slip in between the check and the tombstone. On
    /// rejection nothing changes.
    pub fn delete_checked<F>(&self, id: RecordId, check: F) -> StoreResult<R>
    where
        F: FnOnce(&R) -> StoreResult<()>,
    {
        let mut table = self.table.write();
        self.delete_locked(&mut table, id, check)
            .map_err(|e| self.rejected(e))
    }

    fn delete_locked<F>(&self, table: &mut Table<R>, id: RecordId, check: F) -> StoreResult<R>
    where
        F: FnOnce(&R) -> StoreResult<()>,
    {
        let current = table
            .slots
            .get(id)
            .ok_or(StoreError::NotFound { kind: R::KIND, id })?;
        check(current)?;

        let removed = table
            .slots
            .remove(id)
            .ok_or(StoreError::NotFound { kind: R::KIND, id })?;
        table.keys.remove(id);
        table.secondary.remove_id(id);

        self.metrics.increment_deletes();
        Logger::trace(
            Event::RecordDeleted,
            &[("kind", R::KIND.as_str()), ("id", &id.to_string())],
        );

        self.file
            .rewrite(|record: R| (record.id() != id).then_some(record))
            .map_err(|source| self.persistence_failed(source))?;
        Ok(removed)
    }

    /// Copy of the live record with primary key `id`.
    pub fn get(&self, id: RecordId) -> Option<R> {
        self.table.read().slots.get(id).cloned()
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.table.read().keys.contains(id)
    }

    /// Lowest-id record indexed under `key`.
    ///
    /// Records inserted while the secondary index was full are not found here.
    pub fn find_by_secondary(&self, key: &str) -> Option<R> {
        let table = self.table.read();
        table
            .secondary
            .find(key)
            .and_then(|id| table.slots.get(id))
            .cloned()
    }

    /// First record in id order matching `predicate`.
    pub fn find_first<P>(&self, predicate: P) -> Option<R>
    where
        P: Fn(&R) -> bool,
    {
        self.table.read().ordered().find(|r| predicate(r)).cloned()
    }

    /// Every record matching `predicate`, in id order.
    pub fn filter<P>(&self, predicate: P) -> Vec<R>
    where
        P: Fn(&R) -> bool,
    {
        self.table
            .read()
            .ordered()
            .filter(|r| predicate(r))
            .cloned()
            .collect()
    }

    pub fn count_where<P>(&self, predicate: P) -> usize
    where
        P: Fn(&R) -> bool,
    {
        self.table.read().ordered().filter(|r| predicate(r)).count()
    }

    /// Records holding `fk`, in id order.
    pub fn list_by_foreign_key(&self, fk: ForeignKey) -> Vec<R> {
        self.filter(|record| record.references(fk))
    }

    /// Every live record, in id order.
    pub fn all(&self) -> Vec<R> {
        self.table.read().ordered().cloned().collect()
    }

    /// Renders every live record on its own scoped thread.
    ///
    /// All threads are joined before the Shared lock is released. Results
    /// come back in id order.
    pub fn render_all<T, F>(&self, render: F) -> Vec<T>
    where
        T: Send,
        F: Fn(&R) -> T + Sync,
    {
        let table = self.table.read();
        let render = &render;
        thread::scope(|scope| {
            let handles: Vec<_> = table
                .ordered()
                .map(|record| scope.spawn(move || render(record)))
                .collect();
            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
                })
                .collect()
        })
    }

    pub fn len(&self) -> usize {
        self.table.read().keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.table.read().slots.capacity()
    }

    /// Live primary keys, ascending.
    pub fn live_keys(&self) -> Vec<RecordId> {
        self.table.read().keys.as_slice().to_vec()
    }

    /// Number of secondary index entries currently held.
    pub fn secondary_len(&self) -> usize {
        self.table.read().secondary.len()
    }

    pub fn stats(&self) -> StoreStats {
        let table = self.table.read();
        StoreStats {
            kind: R::KIND,
            live: table.keys.len(),
            capacity: table.slots.capacity(),
            tombstones: table.slots.tombstones(),
            secondary_entries: table.secondary.len(),
            secondary_limit: table.secondary.limit(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        R::KIND
    }

    pub fn file(&self) -> &LineFile {
        &self.file
    }

    /// Current mode of the table lock.
    pub fn lock_state(&self) -> LockState {
        self.table.state()
    }

    /// Fails if another live record already holds one of `record`'s unique
    /// field values. A record never conflicts with itself.
    fn ensure_unique(table: &Table<R>, record: &R) -> StoreResult<()> {
        let fields = record.unique_fields();
        if fields.is_empty() {
            return Ok(());
        }
        for other in table.ordered().filter(|other| other.id() != record.id()) {
            for (field, value) in other.unique_fields() {
                if fields.iter().any(|(f, v)| *f == field && *v == value) {
                    return Err(StoreError::UniqueViolation {
                        kind: R::KIND,
                        field,
                        value,
                        holder: other.id(),
                    });
                }
            }
        }
        Ok(())
    }

    fn rejected(&self, err: StoreError) -> StoreError {
        if err.mutation_applied() {
            return err;
        }
        self.metrics.increment_rejections();
        let event = match err {
            StoreError::ReferentialIntegrity { .. } => Event::IntegrityRejected,
            _ => Event::MutationRejected,
        };
        Logger::info(
            event,
            &[
                ("kind", R::KIND.as_str()),
                ("code", err.code()),
                ("reason", &err.to_string()),
            ],
        );
        err
    }

    fn persistence_failed(&self, source: crate::persistence::PersistenceError) -> StoreError {
        self.metrics.increment_persistence_failures();
        Logger::error(
            Event::PersistenceFailed,
            &[
                ("kind", R::KIND.as_str()),
                ("code", source.code()),
                ("error", &source.to_string()),
            ],
        );
        StoreError::Persistence {
            kind: R::KIND,
            source,
        }
    }
}

impl<R: Record> std::fmt::Debug for RecordStore<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("kind", &R::KIND)
            .field("path", &self.file.path())
            .field("lock", &self.table)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::errors::IntegrityViolation;
    use crate::store::testing::Item;
    use std::fs;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> RecordStore<Item> {
        RecordStore::open(dir.path(), StoreConfig::default(), Arc::new(MetricsRegistry::new())).unwrap()
    }

    fn file_text(store: &RecordStore<Item>) -> String {
        fs::read_to_string(store.file().path()).unwrap_or_default()
    }

    #[test]
    fn test_insert_then_search_both_keys() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.insert(Item::new(1, "CS"), InsertMode::Live).unwrap();

        assert_eq!(store.get(1).unwrap().name, "CS");
        assert_eq!(store.find_by_secondary("CS").unwrap().id, 1);
        assert_eq!(store.len(), 1);
        assert_eq!(file_text(&store), "1 CS -\n");
    }

    #[test]
    fn test_duplicate_leaves_everything_unchanged() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.insert(Item::new(5, "a"), InsertMode::Live).unwrap();

        let err = store.insert(Item::new(5, "b"), InsertMode::Live).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { id: 5, .. }));
        assert_eq!(store.len(), 1);
        assert_eq!(store.live_keys(), vec![5]);
        assert_eq!(store.secondary_len(), 1);
        assert!(store.find_by_secondary("b").is_none());
        assert_eq!(file_text(&store), "5 a -\n");
    }

    #[test]
    fn test_76th_insert_doubles_capacity() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        for id in 1..=75 {
            store.insert(Item::new(id, "d"), InsertMode::Live).unwrap();
        }
        assert_eq!(store.capacity(), 100);

        store.insert(Item::new(76, "d"), InsertMode::Live).unwrap();
        assert_eq!(store.capacity(), 200);
        for id in 1..=76 {
            assert!(store.get(id).is_some(), "id {} lost after growth", id);
        }
    }

    #[test]
    fn test_validation_runs_only_on_live_inserts() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let err = store
            .insert(Item::new(1, "much-too-long"), InsertMode::Live)
            .unwrap_err();
        assert_eq!(err.code(), "CAMPUS_VALIDATION_ERROR");
        assert!(store.is_empty());

        store
            .insert(Item::new(1, "much-too-long"), InsertMode::Load)
            .unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(file_text(&store), "");
    }

    #[test]
    fn test_delete_tombstones_and_frees_slot() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        for (id, name) in [(3, "a"), (103, "b"), (203, "c")] {
            store.insert(Item::new(id, name), InsertMode::Live).unwrap();
        }

        assert_eq!(store.delete(103).unwrap().name, "b");
        assert!(store.get(103).is_none());
        assert!(store.find_by_secondary("b").is_none());
        assert_eq!(store.get(203).unwrap().name, "c");
        assert_eq!(store.live_keys(), vec![3, 203]);
        assert_eq!(store.stats().tombstones, 1);
        assert_eq!(file_text(&store), "3 a -\n203 c -\n");

        store.insert(Item::new(303, "d"), InsertMode::Live).unwrap();
        assert_eq!(store.stats().tombstones, 0);
    }

    #[test]
    fn test_delete_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let err = store.delete(9).unwrap_err();
        assert_eq!(err.code(), "CAMPUS_NOT_FOUND");
    }

    #[test]
    fn test_rejected_delete_keeps_record() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.insert(Item::new(1, "CS"), InsertMode::Live).unwrap();

        let err = store
            .delete_checked(1, |item| {
                Err(StoreError::ReferentialIntegrity {
                    kind: EntityKind::Department,
                    id: item.id,
                    violation: IntegrityViolation::HasDependents {
                        dependent: EntityKind::Instructor,
                        count: 1,
                    },
                })
            })
            .unwrap_err();

        assert_eq!(err.code(), "CAMPUS_REFERENTIAL_INTEGRITY");
        assert!(store.get(1).is_some());
        assert_eq!(store.find_by_secondary("CS").unwrap().id, 1);
        assert_eq!(file_text(&store), "1 CS -\n");
    }

    #[test]
    fn test_update_moves_secondary_entry() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.insert(Item::new(1, "old"), InsertMode::Live).unwrap();
        store.insert(Item::new(2, "other"), InsertMode::Live).unwrap();

        let updated = store.update(1, |item| item.name = "new".into()).unwrap();
        assert_eq!(updated.name, "new");
        assert!(store.find_by_secondary("old").is_none());
        assert_eq!(store.find_by_secondary("new").unwrap().id, 1);
        assert_eq!(file_text(&store), "1 new -\n2 other -\n");
    }

    #[test]
    fn test_invalid_update_changes_nothing() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.insert(Item::new(1, "old"), InsertMode::Live).unwrap();

        let err = store
            .update(1, |item| item.name = "far-too-long".into())
            .unwrap_err();
        assert_eq!(err.code(), "CAMPUS_VALIDATION_ERROR");

        let err = store.update(1, |item| item.id = 2).unwrap_err();
        assert_eq!(err.code(), "CAMPUS_VALIDATION_ERROR");

        assert_eq!(store.get(1).unwrap().name, "old");
        assert_eq!(file_text(&store), "1 old -\n");
    }

    #[test]
    fn test_secondary_index_bound() {
        let dir = TempDir::new().unwrap();
        let config = StoreConfig {
            initial_capacity: 10,
            secondary_capacity: 2,
        };
        let store: RecordStore<Item> =
            RecordStore::open(dir.path(), config, Arc::new(MetricsRegistry::new())).unwrap();

        for (id, name) in [(1, "a"), (2, "b"), (3, "c")] {
            store.insert(Item::new(id, name), InsertMode::Live).unwrap();
        }
        assert_eq!(store.secondary_len(), 2);
        assert!(store.find_by_secondary("c").is_none());
        assert_eq!(store.get(3).unwrap().name, "c");
    }

    #[test]
    fn test_reopen_restores_records() {
        let dir = TempDir::new().unwrap();
        {
            let store = store_in(&dir);
            store.insert(Item::new(1, "a"), InsertMode::Live).unwrap();
            store.insert(Item::new(2, "b").owned_by(7), InsertMode::Live).unwrap();
            store.delete(1).unwrap();
        }

        let store = store_in(&dir);
        assert_eq!(store.all(), vec![Item::new(2, "b").owned_by(7)]);
        assert_eq!(store.find_by_secondary("b").unwrap().owner, Some(7));
    }

    #[test]
    fn test_load_skips_duplicate_ids() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Departments.txt"), "1 first -\n1 second -\n2 x -\n").unwrap();

        let store = store_in(&dir);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(1).unwrap().name, "first");
    }

    #[test]
    fn test_malformed_file_fails_open() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Departments.txt"), "1 a -\noops\n").unwrap();

        let err = RecordStore::<Item>::open(
            dir.path(),
            StoreConfig::default(),
            Arc::new(MetricsRegistry::new()),
        )
        .unwrap_err();
        assert_eq!(err.code(), "CAMPUS_MALFORMED_RECORD");
    }

    #[test]
    fn test_append_failure_keeps_insert() {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("data");
        fs::create_dir(&data).unwrap();
        let metrics = Arc::new(MetricsRegistry::new());
        let store: RecordStore<Item> =
            RecordStore::open(&data, StoreConfig::default(), Arc::clone(&metrics)).unwrap();

        fs::remove_dir(&data).unwrap();
        let err = store.insert(Item::new(1, "a"), InsertMode::Live).unwrap_err();

        assert!(err.mutation_applied());
        assert_eq!(err.code(), "CAMPUS_IO_ERROR");
        assert_eq!(store.get(1).unwrap().name, "a");
        assert_eq!(metrics.snapshot().persistence_failures, 1);
        assert_eq!(metrics.snapshot().rejections, 0);
    }

    #[test]
    fn test_list_by_foreign_key_in_id_order() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.insert(Item::new(9, "a").owned_by(1), InsertMode::Live).unwrap();
        store.insert(Item::new(4, "b").owned_by(1), InsertMode::Live).unwrap();
        store.insert(Item::new(6, "c").owned_by(2), InsertMode::Live).unwrap();

        let ids: Vec<_> = store
            .list_by_foreign_key(ForeignKey::new(EntityKind::Instructor, 1))
            .iter()
            .map(|item| item.id)
            .collect();
        assert_eq!(ids, vec![4, 9]);
        assert_eq!(store.count_where(|item| item.owner == Some(2)), 1);
    }

    #[test]
    fn test_insert_next_assigns_max_plus_one() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.insert(Item::new(4, "a"), InsertMode::Live).unwrap();

        let item = store
            .insert_next(|id, live| {
                assert_eq!(live.len(), 1);
                Ok(Item::new(id, "b"))
            })
            .unwrap();
        assert_eq!(item.id, 5);
        assert_eq!(store.live_keys(), vec![4, 5]);
    }

    #[test]
    fn test_insert_next_after_largest_id_is_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Departments.txt"), "4294967295 top -
").unwrap();
        let metrics = Arc::new(MetricsRegistry::new());
        let store: RecordStore<Item> =
            RecordStore::open(dir.path(), StoreConfig::default(), Arc::clone(&metrics)).unwrap();

        let mut built = false;
        let err = store
            .insert_next(|id, _| {
                built = true;
                Ok(Item::new(id, "next"))
            })
            .unwrap_err();

        assert!(!built);
        assert_eq!(err.code(), "CAMPUS_VALIDATION_ERROR");
        assert!(!err.mutation_applied());
        assert_eq!(store.live_keys(), vec![RecordId::MAX]);
        assert_eq!(file_text(&store), "4294967295 top -\n");
        assert_eq!(metrics.snapshot().rejections, 1);
        assert_eq!(store.lock_state(), LockState::Free);
    }

    #[test]
    fn test_failed_rewrite_keeps_update_in_memory() {
        let dir = TempDir::new().unwrap();
        let metrics = Arc::new(MetricsRegistry::new());
        let store: RecordStore<Item> =
            RecordStore::open(dir.path(), StoreConfig::default(), Arc::clone(&metrics)).unwrap();
        store.insert(Item::new(1, "old"), InsertMode::Live).unwrap();

        // A directory where the temp file should go makes the rewrite fail.
        fs::create_dir(store.file().temp_path()).unwrap();
        let err = store.update(1, |item| item.name = "new".into()).unwrap_err();

        assert!(err.mutation_applied());
        assert_eq!(err.code(), "CAMPUS_IO_ERROR");
        assert_eq!(store.get(1).unwrap().name, "new");
        assert_eq!(store.find_by_secondary("new").unwrap().id, 1);
        assert!(store.find_by_secondary("old").is_none());
        assert_eq!(file_text(&store), "1 old -\n");
        assert_eq!(metrics.snapshot().updates, 1);
        assert_eq!(metrics.snapshot().persistence_failures, 1);
        assert_eq!(metrics.snapshot().rejections, 0);
    }

    #[test]
    fn test_render_all_returns_id_order() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        for id in [30, 10, 20] {
            store.insert(Item::new(id, "r"), InsertMode::Live).unwrap();
        }

        let lines = store.render_all(|item| format!("{}:{}", item.id, item.name));
        assert_eq!(lines, vec!["10:r", "20:r", "30:r"]);
        assert_eq!(store.lock_state(), LockState::Free);
    }

    #[test]
    fn test_metrics_count_operations() {
        let dir = TempDir::new().unwrap();
        let metrics = Arc::new(MetricsRegistry::new());
        let store: RecordStore<Item> =
            RecordStore::open(dir.path(), StoreConfig::default(), Arc::clone(&metrics)).unwrap();

        store.insert(Item::new(1, "a"), InsertMode::Live).unwrap();
        let _ = store.insert(Item::new(1, "a"), InsertMode::Live);
        store.update(1, |item| item.name = "b".into()).unwrap();
        store.delete(1).unwrap();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.inserts, 1);
        assert_eq!(snapshot.rejections, 1);
        assert_eq!(snapshot.updates, 1);
        assert_eq!(snapshot.deletes, 1);
    }
}
