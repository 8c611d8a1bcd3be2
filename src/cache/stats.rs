//! Cache Statistics Module
//!
//! Tracks cache performance metrics across both tiers, including hits,
//! misses, evictions, and durable-layer failures.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache performance metrics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Number of successful retrievals from either tier
    pub hits: u64,
    /// Subset of hits served by loading a durable record
    pub durable_hits: u64,
    /// Number of failed retrievals (key absent or expired)
    pub misses: u64,
    /// Number of entries evicted from the memory tier by the capacity policy
    pub evictions: u64,
    /// Number of expired entries removed on access, counting each tier
    pub expired_removals: u64,
    /// Number of unreadable record files dropped
    pub corrupt_dropped: u64,
    /// Number of durable writes that failed and were skipped
    pub failed_writes: u64,
    /// Current number of entries in the memory tier
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Record Hit ==
    /// Increments the hit counter for a memory-tier hit.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    /// Increments the hit counters for a hit served from a durable record.
    ///
    /// Durable hits also count toward `hits`.
    pub fn record_durable_hit(&mut self) {
        self.hits += 1;
        self.durable_hits += 1;
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Eviction ==
    /// Increments the eviction counter.
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    // == Record Removals ==
    /// Increments the expired-removal counter.
    pub fn record_expired(&mut self) {
        self.expired_removals += 1;
    }

    /// Increments the corrupt-record counter.
    pub fn record_corrupt(&mut self) {
        self.corrupt_dropped += 1;
    }

    /// Increments the failed durable write counter.
    pub fn record_failed_write(&mut self) {
        self.failed_writes += 1;
    }

    // == Update Entry Count ==
    /// Updates the memory tier entry count.
    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
