//! Engine counters
//!
//! - Counters only, monotonic, reset on process start
//! - Shared by every store of one catalog
//! - Relaxed atomics; exactness per counter, not across counters

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Atomic operation counters.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Records inserted from disk at startup
    records_loaded: AtomicU64,
    /// Live inserts that reached the table
    inserts: AtomicU64,
    /// Updates applied in memory
    updates: AtomicU64,
    /// Records tombstoned
    deletes: AtomicU64,
    /// Mutations rejected before touching state
    rejections: AtomicU64,
    /// Hash table growth events
    growth_events: AtomicU64,
    /// Failed appends or rewrites
    persistence_failures: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_loaded(&self) {
        self.records_loaded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_inserts(&self) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_updates(&self) {
        self.updates.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_deletes(&self) {
        self.deletes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_rejections(&self) {
        self.rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_growth_events(&self) {
        self.growth_events.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_persistence_failures(&self) {
        self.persistence_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            records_loaded: self.records_loaded.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            updates: self.updates.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            rejections: self.rejections.load(Ordering::Relaxed),
            growth_events: self.growth_events.load(Ordering::Relaxed),
            persistence_failures: self.persistence_failures.load(Ordering::Relaxed),
        }
    }

    /// Current values as a JSON object
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub records_loaded: u64,
    pub inserts: u64,
    pub updates: u64,
    pub deletes: u64,
    pub rejections: u64,
    pub growth_events: u64,
    pub persistence_failures: u64,
}
