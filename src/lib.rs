//! campusdb - embedded, file-backed campus records
//!
//! Departments, instructors, students, courses, enrollments and instructor
//! phone numbers, each held in its own hash-indexed `RecordStore` guarded by
//! a table-level shared/exclusive lock and persisted as one text file per
//! kind.
//!
//! ```ignore
//! use campusdb::catalog::{Catalog, CatalogOptions};
//! use campusdb::entities::Department;
//!
//! let catalog = Catalog::open(Path::new("./data"), CatalogOptions::default())?;
//! catalog.insert(Department::new(1, "CS", "12345"))?;
//! assert_eq!(catalog.department_by_name("CS").unwrap().id, 1);
//! ```

pub mod catalog;
pub mod cli;
pub mod entities;
pub mod lock;
pub mod observability;
pub mod persistence;
pub mod store;
