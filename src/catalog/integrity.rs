//! Cross-store referential integrity
//!
//! Owner → dependents:
//! - department → instructor, student, course
//! - instructor → course, phone
//! - student → enrollment
//! - course → enrollment
//!
//! Foreign keys are checked before the dependent store is locked; each
//! lookup holds the owner's Shared lock only for the lookup itself.
//! Dependent scans run while the deleting store holds its Exclusive lock
//! and take each dependent's Shared lock in turn. The graph is acyclic, so
//! locks are always ordered owner before dependent.

use super::manager::Catalog;
use crate::observability::{Event, Logger};
use crate::store::{EntityKind, ForeignKey, IntegrityViolation, Record, RecordId, StoreError, StoreResult};

/// Kinds whose records may hold a key of `owner`.
pub fn dependents_of(owner: EntityKind) -> &'static [EntityKind] {
    match owner {
        EntityKind::Department => &[EntityKind::Instructor, EntityKind::Student, EntityKind::Course],
        EntityKind::Instructor => &[EntityKind::Course, EntityKind::Phone],
        EntityKind::Student => &[EntityKind::Enrollment],
        EntityKind::Course => &[EntityKind::Enrollment],
        EntityKind::Enrollment | EntityKind::Phone => &[],
    }
}

/// Integrity checks over one catalog's stores.
pub struct Integrity<'a> {
    catalog: &'a Catalog,
}

impl<'a> Integrity<'a> {
    pub(crate) fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Whether the key `fk` points at is live.
    pub fn exists(&self, fk: ForeignKey) -> bool {
        let c = self.catalog;
        match fk.kind {
            EntityKind::Department => c.departments().contains(fk.id),
            EntityKind::Instructor => c.instructors().contains(fk.id),
            EntityKind::Student => c.students().contains(fk.id),
            EntityKind::Course => c.courses().contains(fk.id),
            EntityKind::Enrollment => c.enrollments().contains(fk.id),
            EntityKind::Phone => c.phones().contains(fk.id),
        }
    }

    /// Rejects `record` if any of its foreign keys is not live.
    pub fn ensure_references<R: Record>(&self, record: &R) -> StoreResult<()> {
        match record.foreign_keys().into_iter().find(|fk| !self.exists(*fk)) {
            None => Ok(()),
            Some(missing) => Err(self.reject(
                R::KIND,
                record.id(),
                IntegrityViolation::MissingReference(missing),
            )),
        }
    }

    /// Live records of `dependent` holding `target`.
    pub fn count_dependents(&self, target: ForeignKey, dependent: EntityKind) -> usize {
        let c = self.catalog;
        match dependent {
            EntityKind::Department => c.departments().count_where(|r| r.references(target)),
            EntityKind::Instructor => c.instructors().count_where(|r| r.references(target)),
            EntityKind::Student => c.students().count_where(|r| r.references(target)),
            EntityKind::Course => c.courses().count_where(|r| r.references(target)),
            EntityKind::Enrollment => c.enrollments().count_where(|r| r.references(target)),
            EntityKind::Phone => c.phones().count_where(|r| r.references(target)),
        }
    }

    /// Rejects deleting `kind` record `id` while any dependent still holds it.
    ///
    /// The caller must hold `kind`'s Exclusive lock.
    pub fn ensure_no_dependents(&self, kind: EntityKind, id: RecordId) -> StoreResult<()> {
        let target = ForeignKey::new(kind, id);
        for &dependent in dependents_of(kind) {
            let count = self.count_dependents(target, dependent);
            if count > 0 {
                return Err(StoreError::ReferentialIntegrity {
                    kind,
                    id,
                    violation: IntegrityViolation::HasDependents { dependent, count },
                });
            }
        }
        Ok(())
    }

    fn reject(&self, kind: EntityKind, id: RecordId, violation: IntegrityViolation) -> StoreError {
        self.catalog.metrics().increment_rejections();
        let err = StoreError::ReferentialIntegrity { kind, id, violation };
        Logger::info(
            Event::IntegrityRejected,
            &[
                ("kind", kind.as_str()),
                ("id", &id.to_string()),
                ("reason", &err.to_string()),
            ],
        );
        err
    }
}
