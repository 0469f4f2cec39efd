//! Catalog: the six record stores of one data directory
//!
//! # API
//!
//! - `open(dir, options)` - Create the directory if needed and load every store
//! - `insert(record)` / `delete::<R>(id)` - Integrity-checked mutations for any kind
//! - `update_*` - The mutable field of each kind
//! - `*_by_*` / `*_in_*` / `*_of_*` - Lookups and list-by-foreign-key
//! - `course_stats(id)` - Enrollment counts by status
//!
//! The catalog holds no lock of its own. Every operation goes through the
//! per-kind `RecordStore` locks.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use super::errors::{CatalogError, CatalogResult};
use super::integrity::Integrity;
use crate::entities::{
    full_name, Course, Department, Enrollment, EnrollmentStatus, Grade, Instructor, PhoneNumber,
    Student,
};
use crate::observability::{Event, Logger, MetricsRegistry, MetricsSnapshot};
use crate::store::{
    EntityKind, ForeignKey, InsertMode, Record, RecordId, RecordStore, StoreConfig, StoreError,
    StoreResult, StoreStats,
};

/// Sizing and limits applied to every store of a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogOptions {
    pub store: StoreConfig,
    /// Phone numbers allowed per instructor
    pub max_phone_numbers: usize,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            max_phone_numbers: 3,
        }
    }
}

/// A record kind the catalog holds a store for.
pub trait Catalogued: Record + Serialize {
    fn store(catalog: &Catalog) -> &RecordStore<Self>;
}

impl Catalogued for Department {
    fn store(catalog: &Catalog) -> &RecordStore<Self> {
        &catalog.departments
    }
}

impl Catalogued for Instructor {
    fn store(catalog: &Catalog) -> &RecordStore<Self> {
        &catalog.instructors
    }
}

impl Catalogued for Student {
    fn store(catalog: &Catalog) -> &RecordStore<Self> {
        &catalog.students
    }
}

impl Catalogued for Course {
    fn store(catalog: &Catalog) -> &RecordStore<Self> {
        &catalog.courses
    }
}

impl Catalogued for Enrollment {
    fn store(catalog: &Catalog) -> &RecordStore<Self> {
        &catalog.enrollments
    }
}

impl Catalogued for PhoneNumber {
    fn store(catalog: &Catalog) -> &RecordStore<Self> {
        &catalog.phones
    }
}

/// Enrollment counts for one course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CourseStats {
    pub course_id: RecordId,
    pub enrolled: usize,
    pub dropped: usize,
    pub completed: usize,
}

impl CourseStats {
    pub fn total(&self) -> usize {
        self.enrolled + self.dropped + self.completed
    }

    /// Enrollments still in progress.
    pub fn active(&self) -> usize {
        self.enrolled
    }
}

/// Shape of every store plus the shared counters.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogStats {
    pub data_dir: PathBuf,
    pub stores: Vec<StoreStats>,
    pub metrics: MetricsSnapshot,
}

pub struct Catalog {
    data_dir: PathBuf,
    options: CatalogOptions,
    metrics: Arc<MetricsRegistry>,
    departments: RecordStore<Department>,
    instructors: RecordStore<Instructor>,
    students: RecordStore<Student>,
    courses: RecordStore<Course>,
    enrollments: RecordStore<Enrollment>,
    phones: RecordStore<PhoneNumber>,
}

impl Catalog {
    /// Opens (creating if needed) `data_dir` and loads every entity file.
    ///
    /// Stores load owners first. Loading does not check foreign keys.
    pub fn open(data_dir: &Path, options: CatalogOptions) -> CatalogResult<Self> {
        fs::create_dir_all(data_dir).map_err(|source| CatalogError::DataDir {
            path: data_dir.to_path_buf(),
            source,
        })?;

        let metrics = Arc::new(MetricsRegistry::new());
        let config = options.store;
        let catalog = Self {
            data_dir: data_dir.to_path_buf(),
            options,
            departments: RecordStore::open(data_dir, config, Arc::clone(&metrics))?,
            instructors: RecordStore::open(data_dir, config, Arc::clone(&metrics))?,
            students: RecordStore::open(data_dir, config, Arc::clone(&metrics))?,
            courses: RecordStore::open(data_dir, config, Arc::clone(&metrics))?,
            enrollments: RecordStore::open(data_dir, config, Arc::clone(&metrics))?,
            phones: RecordStore::open(data_dir, config, Arc::clone(&metrics))?,
            metrics,
        };

        Logger::info(
            Event::CatalogOpened,
            &[
                ("data_dir", &catalog.data_dir.display().to_string()),
                ("records", &catalog.metrics.snapshot().records_loaded.to_string()),
            ],
        );
        Ok(catalog)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    pub fn integrity(&self) -> Integrity<'_> {
        Integrity::new(self)
    }

    pub fn store<R: Catalogued>(&self) -> &RecordStore<R> {
        R::store(self)
    }

    pub fn departments(&self) -> &RecordStore<Department> {
        &self.departments
    }

    pub fn instructors(&self) -> &RecordStore<Instructor> {
        &self.instructors
    }

    pub fn students(&self) -> &RecordStore<Student> {
        &self.students
    }

    pub fn courses(&self) -> &RecordStore<Course> {
        &self.courses
    }

    pub fn enrollments(&self) -> &RecordStore<Enrollment> {
        &self.enrollments
    }

    pub fn phones(&self) -> &RecordStore<PhoneNumber> {
        &self.phones
    }

    // ---- generic mutations ----

    /// Inserts a live record after checking its foreign keys.
    pub fn insert<R: Catalogued>(&self, record: R) -> StoreResult<()> {
        self.integrity().ensure_references(&record)?;
        R::store(self).insert(record, InsertMode::Live)
    }

    /// Deletes record `id` unless a dependent still refers to it.
    pub fn delete<R: Catalogued>(&self, id: RecordId) -> StoreResult<R> {
        R::store(self).delete_checked(id, |_| self.integrity().ensure_no_dependents(R::KIND, id))
    }

    pub fn get<R: Catalogued>(&self, id: RecordId) -> Option<R> {
        R::store(self).get(id)
    }

    /// Lookup by the kind's secondary key.
    pub fn find<R: Catalogued>(&self, key: &str) -> Option<R> {
        R::store(self).find_by_secondary(key)
    }

    // ---- departments ----

    pub fn update_department_phone(&self, id: RecordId, phone: &str) -> StoreResult<Department> {
        self.departments.update(id, |d| d.phone = phone.to_string())
    }

    pub fn department_by_name(&self, name: &str) -> Option<Department> {
        self.departments.find_by_secondary(name)
    }

    pub fn department_by_phone(&self, phone: &str) -> Option<Department> {
        self.departments.find_first(|d| d.phone == phone)
    }

    // ---- instructors ----

    pub fn update_instructor_email(&self, id: RecordId, email: &str) -> StoreResult<Instructor> {
        self.instructors.update(id, |i| i.email = email.to_string())
    }

    pub fn instructor_by_name(&self, first_name: &str, last_name: &str) -> Option<Instructor> {
        self.instructors
            .find_by_secondary(&full_name(first_name, last_name))
    }

    pub fn instructor_by_email(&self, email: &str) -> Option<Instructor> {
        self.instructors.find_first(|i| i.email == email)
    }

    pub fn instructors_in_department(&self, department_id: RecordId) -> Vec<Instructor> {
        self.instructors
            .list_by_foreign_key(ForeignKey::new(EntityKind::Department, department_id))
    }

    /// Adds a phone number to an instructor, assigning the next free id.
    pub fn add_instructor_phone(&self, instructor_id: RecordId, phone: &str) -> StoreResult<PhoneNumber> {
        let candidate = PhoneNumber {
            id: 0,
            instructor_id,
            phone: phone.to_string(),
        };
        self.integrity().ensure_references(&candidate)?;

        let limit = self.options.max_phone_numbers;
        self.phones.insert_next(|id, live| {
            let held = live
                .iter()
                .filter(|p| p.instructor_id == instructor_id)
                .count();
            if held >= limit {
                return Err(StoreError::validation(
                    EntityKind::Phone,
                    format!(
                        "instructor {} already has {} phone numbers (limit {})",
                        instructor_id, held, limit
                    ),
                ));
            }
            Ok(PhoneNumber { id, ..candidate })
        })
    }

    pub fn remove_instructor_phone(&self, phone_id: RecordId) -> StoreResult<PhoneNumber> {
        self.delete(phone_id)
    }

    pub fn phones_of_instructor(&self, instructor_id: RecordId) -> Vec<PhoneNumber> {
        self.phones
            .list_by_foreign_key(ForeignKey::new(EntityKind::Instructor, instructor_id))
    }

    // ---- students ----

    pub fn update_student_phone(&self, id: RecordId, phone: &str) -> StoreResult<Student> {
        self.students.update(id, |s| s.phone = phone.to_string())
    }

    pub fn student_by_name(&self, first_name: &str, last_name: &str) -> Option<Student> {
        self.students.find_by_secondary(&full_name(first_name, last_name))
    }

    pub fn student_by_email(&self, email: &str) -> Option<Student> {
        self.students.find_first(|s| s.email == email)
    }

    pub fn students_in_department(&self, department_id: RecordId) -> Vec<Student> {
        self.students
            .list_by_foreign_key(ForeignKey::new(EntityKind::Department, department_id))
    }

    // ---- courses ----

    /// Reassigns a course. The new instructor must be live.
    pub fn update_course_instructor(&self, id: RecordId, instructor_id: RecordId) -> StoreResult<Course> {
        let mut reassigned = self
            .courses
            .get(id)
            .ok_or(StoreError::NotFound {
                kind: EntityKind::Course,
                id,
            })?;
        reassigned.instructor_id = instructor_id;
        self.integrity().ensure_references(&reassigned)?;
        self.courses.update(id, |c| c.instructor_id = instructor_id)
    }

    pub fn course_by_title(&self, title: &str) -> Option<Course> {
        self.courses.find_by_secondary(title)
    }

    pub fn courses_in_department(&self, department_id: RecordId) -> Vec<Course> {
        self.courses
            .list_by_foreign_key(ForeignKey::new(EntityKind::Department, department_id))
    }

    pub fn courses_of_instructor(&self, instructor_id: RecordId) -> Vec<Course> {
        self.courses
            .list_by_foreign_key(ForeignKey::new(EntityKind::Instructor, instructor_id))
    }

    // ---- enrollments ----

    pub fn update_enrollment_grade(&self, id: RecordId, grade: Option<Grade>) -> StoreResult<Enrollment> {
        self.enrollments.update(id, |e| e.grade = grade)
    }

    pub fn update_enrollment_status(&self, id: RecordId, status: EnrollmentStatus) -> StoreResult<Enrollment> {
        self.enrollments.update(id, |e| e.status = status)
    }

    pub fn enrollment_for(&self, student_id: RecordId, course_id: RecordId) -> Option<Enrollment> {
        self.enrollments
            .find_first(|e| e.student_id == student_id && e.course_id == course_id)
    }

    pub fn is_enrolled(&self, student_id: RecordId, course_id: RecordId) -> bool {
        self.enrollment_for(student_id, course_id).is_some()
    }

    pub fn enrollments_of_student(&self, student_id: RecordId) -> Vec<Enrollment> {
        self.enrollments
            .list_by_foreign_key(ForeignKey::new(EntityKind::Student, student_id))
    }

    pub fn enrollments_of_course(&self, course_id: RecordId) -> Vec<Enrollment> {
        self.enrollments
            .list_by_foreign_key(ForeignKey::new(EntityKind::Course, course_id))
    }

    /// Students holding any enrollment in `course_id`, in student id order.
    pub fn students_in_course(&self, course_id: RecordId) -> Vec<Student> {
        let mut ids: Vec<RecordId> = self
            .enrollments_of_course(course_id)
            .iter()
            .map(|e| e.student_id)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids.into_iter().filter_map(|id| self.students.get(id)).collect()
    }

    pub fn course_stats(&self, course_id: RecordId) -> StoreResult<CourseStats> {
        if !self.courses.contains(course_id) {
            return Err(StoreError::NotFound {
                kind: EntityKind::Course,
                id: course_id,
            });
        }

        let mut stats = CourseStats {
            course_id,
            enrolled: 0,
            dropped: 0,
            completed: 0,
        };
        for enrollment in self.enrollments_of_course(course_id) {
            match enrollment.status {
                EnrollmentStatus::Enrolled => stats.enrolled += 1,
                EnrollmentStatus::Dropped => stats.dropped += 1,
                EnrollmentStatus::Completed => stats.completed += 1,
            }
        }
        Ok(stats)
    }

    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            data_dir: self.data_dir.clone(),
            stores: vec![
                self.departments.stats(),
                self.instructors.stats(),
                self.students.stats(),
                self.courses.stats(),
                self.enrollments.stats(),
                self.phones.stats(),
            ],
            metrics: self.metrics.snapshot(),
        }
    }
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("data_dir", &self.data_dir)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
