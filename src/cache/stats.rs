//! Cache Statistics Module
//!
//! Counts what mutating operations did. Lookups are read-only and are not
//! counted.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache activity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Pushes that added a key not previously present
    pub insertions: u64,
    /// Pushes that refreshed an existing key
    pub refreshes: u64,
    /// Entries dropped by the eviction policy or by `pop`
    pub evictions: u64,
    /// Entries dropped by `erase`
    pub removals: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Share of pushes that found their key already cached.
    ///
    /// Returns refreshes / (insertions + refreshes), or 0.0 if nothing was pushed.
    pub fn hit_rate(&self) -> f64 {
        let total = self.insertions + self.refreshes;
        if total == 0 {
            0.0
        } else {
            self.refreshes as f64 / total as f64
        }
    }

    pub fn record_insertion(&mut self) {
        self.insertions += 1;
    }

    pub fn record_refresh(&mut self) {
        self.refreshes += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_removal(&mut self) {
        self.removals += 1;
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
