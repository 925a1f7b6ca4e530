//! Cache statistics tracking and reporting.

use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Runtime cache counters.
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub writes: u64,
    pub write_failures: u64,
    pub invalidations: u64,
    /// Entries deleted because they failed to deserialize.
    pub corrupt_removed: u64,
    /// Entries deleted by the TTL sweep.
    pub expired_removed: u64,
    pub created_at: Instant,
}

impl Default for CacheStats {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStats {
    pub fn new() -> Self {
        Self {
            hits: 0,
            misses: 0,
            writes: 0,
            write_failures: 0,
            invalidations: 0,
            corrupt_removed: 0,
            expired_removed: 0,
            created_at: Instant::now(),
        }
    }

    /// Hit rate over all reads (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Uptime since statistics started.
    pub fn uptime(&self) -> Duration {
        self.created_at.elapsed()
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_write(&mut self) {
        self.writes += 1;
    }

    pub fn record_write_failure(&mut self) {
        self.write_failures += 1;
    }

    pub fn record_invalidation(&mut self) {
        self.invalidations += 1;
    }

    pub fn record_corrupt_removed(&mut self) {
        self.corrupt_removed += 1;
    }

    pub fn record_expired_removed(&mut self, count: u64) {
        self.expired_removed += count;
    }
}

/// Snapshot of cache contents and counters for reporting.
///
/// Entry counts and sizes come from walking the store at snapshot time;
/// the medium is the source of truth, not in-memory bookkeeping.
#[derive(Debug, Clone)]
pub struct CacheStatistics {
    pub cache_dir: PathBuf,
    pub ttl: Duration,
    pub total_entries: usize,
    pub valid_entries: usize,
    pub expired_entries: usize,
    pub total_size_bytes: u64,
    pub counters: CacheStats,
    pub hit_rate_percent: f64,
}
