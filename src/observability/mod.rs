//! Observability for campusdb
//!
//! - Structured JSON-line logging with a process-wide severity floor
//! - Typed engine events
//! - Per-catalog operation counters
//!
//! Observability is read-only: nothing here changes the outcome of an
//! engine operation, and logging failures are swallowed.
//!
//! ```ignore
//! use campusdb::observability::{Event, Logger};
//!
//! Logger::info(Event::RecordInserted, &[("kind", "department"), ("id", "1")]);
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
