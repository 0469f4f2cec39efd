//! Catalog of campus records
//!
//! Owns one `RecordStore` per entity kind over a shared data directory and
//! enforces foreign keys between them.

mod errors;
mod integrity;
mod manager;

pub use errors::{CatalogError, CatalogResult};
pub use integrity::{dependents_of, Integrity};
pub use manager::{Catalog, CatalogOptions, CatalogStats, Catalogued, CourseStats};
