//! Line-oriented persistence for campusdb
//!
//! Each entity kind owns one plain-text file. The file is read once at
//! startup, appended to on insert and rewritten through a temp file on
//! update and delete. Memory and disk can diverge when a write fails; the
//! in-memory mutation is not rolled back.

mod codec;
mod errors;
mod line_file;

pub use codec::{DecodeError, Fields, LineRecord};
pub use errors::{PersistenceError, PersistenceResult};
pub use line_file::LineFile;
