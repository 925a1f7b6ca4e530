//! File-backed forecast cache with TTL validation.
//!
//! Entries live under one subdirectory per calendar day; age is derived
//! from file modification time, so the storage medium is the source of
//! truth across process restarts. Reads probe today's bucket and
//! yesterday's; corrupt entries self-heal by deletion. Writes publish
//! atomically (temp file + rename) so a half-written entry is never
//! observed under its final name.

use super::key::CacheKey;
use super::path::{bucket_dir, bucket_name, entry_path, parse_bucket_date, probe_dates};
use super::stats::{CacheStats, CacheStatistics};
use super::types::{CacheConfig, CacheError};
use crate::forecast::ForecastPayload;
use chrono::{Local, NaiveDate};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime};
use tracing::{debug, info, warn};

/// TTL-validated result cache for forecast payloads.
///
/// All mutating operations and the read-then-possibly-delete path in
/// `get` are serialized by a single lock per instance. Deserialization
/// happens outside the lock once existence and freshness are confirmed.
pub struct ForecastCache {
    cache_dir: PathBuf,
    ttl: Duration,
    /// The instance lock; also owns the runtime counters.
    state: Mutex<CacheStats>,
}

impl ForecastCache {
    /// Creates a cache rooted at the configured directory, creating it if
    /// needed.
    pub fn new(config: CacheConfig) -> Result<Self, CacheError> {
        fs::create_dir_all(&config.cache_dir)?;

        info!(
            cache_dir = %config.cache_dir.display(),
            ttl_secs = config.ttl.as_secs(),
            "forecast cache initialized"
        );

        Ok(Self {
            cache_dir: config.cache_dir,
            ttl: config.ttl,
            state: Mutex::new(CacheStats::new()),
        })
    }

    /// Root directory of the cache.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Configured time-to-live.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Retrieves a cached forecast if present, fresh, and parseable.
    ///
    /// Probes today's bucket, then yesterday's (for entries written just
    /// before midnight). A corrupt entry is deleted and treated as absent.
    pub fn get(&self, lat: f64, lon: f64, horizon_days: u32) -> Option<ForecastPayload> {
        let key = CacheKey::new(lat, lon, horizon_days);
        let today = Local::now().date_naive();

        for date in probe_dates(today) {
            let path = entry_path(&self.cache_dir, date, &key);
            let Some(bytes) = self.read_valid(&path) else {
                continue;
            };

            match serde_json::from_slice::<ForecastPayload>(&bytes) {
                Ok(payload) => {
                    self.state.lock().unwrap().record_hit();
                    debug!(key = %key, bucket = %bucket_name(date), "cache hit");
                    return Some(payload);
                }
                Err(error) => {
                    warn!(key = %key, %error, "corrupt cache entry, removing");
                    self.remove_corrupt(&path);
                }
            }
        }

        self.state.lock().unwrap().record_miss();
        debug!(key = %key, "cache miss");
        None
    }

    /// Stores a forecast under the derived key in today's bucket.
    ///
    /// Failures are reported, never panicked on; callers treat caching as
    /// best-effort.
    pub fn set(
        &self,
        lat: f64,
        lon: f64,
        horizon_days: u32,
        payload: &ForecastPayload,
    ) -> Result<(), CacheError> {
        let key = CacheKey::new(lat, lon, horizon_days);
        let today = Local::now().date_naive();

        let mut state = self.state.lock().unwrap();
        match self.write_entry(today, &key, payload) {
            Ok(()) => {
                state.record_write();
                debug!(key = %key, bucket = %bucket_name(today), "cache set");
                Ok(())
            }
            Err(error) => {
                state.record_write_failure();
                warn!(key = %key, %error, "cache write failed");
                Err(error)
            }
        }
    }

    /// Removes the entry for a key from today's and yesterday's bucket.
    ///
    /// Returns whether anything was removed.
    pub fn invalidate(&self, lat: f64, lon: f64, horizon_days: u32) -> bool {
        let key = CacheKey::new(lat, lon, horizon_days);
        let today = Local::now().date_naive();

        let mut state = self.state.lock().unwrap();
        let mut removed = false;
        for date in probe_dates(today) {
            let path = entry_path(&self.cache_dir, date, &key);
            if path.exists() && fs::remove_file(&path).is_ok() {
                state.record_invalidation();
                removed = true;
            }
        }

        if removed {
            info!(key = %key, "cache entry invalidated");
        }
        removed
    }

    /// Removes expired entries across all day buckets.
    ///
    /// A bucket whose latest possible write (end of its day) is older than
    /// the TTL is removed wholesale; buckets within the TTL window are
    /// scanned entry by entry. Returns the number of entries removed.
    pub fn sweep_expired(&self) -> u64 {
        let mut state = self.state.lock().unwrap();
        let mut removed = 0u64;

        let Ok(dir_entries) = fs::read_dir(&self.cache_dir) else {
            return 0;
        };

        for dir_entry in dir_entries.flatten() {
            let bucket_path = dir_entry.path();
            if !bucket_path.is_dir() {
                continue;
            }
            let Some(date) = dir_entry
                .file_name()
                .to_str()
                .and_then(parse_bucket_date)
            else {
                continue;
            };

            if self.bucket_fully_expired(date) {
                removed += remove_bucket_entries(&bucket_path);
                let _ = fs::remove_dir(&bucket_path);
            } else {
                removed += self.remove_expired_entries(&bucket_path);
                // Drops the directory only if the scan emptied it.
                let _ = fs::remove_dir(&bucket_path);
            }
        }

        if removed > 0 {
            state.record_expired_removed(removed);
            info!(removed, "cache sweep removed expired forecasts");
        }
        removed
    }

    /// Snapshot of cache contents and runtime counters.
    pub fn stats(&self) -> CacheStatistics {
        let state = self.state.lock().unwrap();

        let mut total_entries = 0;
        let mut valid_entries = 0;
        let mut expired_entries = 0;
        let mut total_size_bytes = 0;

        for path in self.walk_entries() {
            total_entries += 1;
            if let Ok(metadata) = fs::metadata(&path) {
                total_size_bytes += metadata.len();
            }
            if self.entry_valid(&path) {
                valid_entries += 1;
            } else {
                expired_entries += 1;
            }
        }

        CacheStatistics {
            cache_dir: self.cache_dir.clone(),
            ttl: self.ttl,
            total_entries,
            valid_entries,
            expired_entries,
            total_size_bytes,
            hit_rate_percent: state.hit_rate() * 100.0,
            counters: state.clone(),
        }
    }

    /// Reads entry bytes under the lock once existence and freshness are
    /// confirmed. Writes publish atomically via rename, so bytes read
    /// here are never torn.
    fn read_valid(&self, path: &Path) -> Option<Vec<u8>> {
        let _guard = self.state.lock().unwrap();
        if !self.entry_valid(path) {
            return None;
        }
        fs::read(path).ok()
    }

    fn remove_corrupt(&self, path: &Path) {
        let mut state = self.state.lock().unwrap();
        if fs::remove_file(path).is_ok() {
            state.record_corrupt_removed();
        }
    }

    /// An entry is valid iff it exists and its mtime is younger than the
    /// TTL. A modification time in the future counts as fresh.
    fn entry_valid(&self, path: &Path) -> bool {
        let Ok(metadata) = fs::metadata(path) else {
            return false;
        };
        let Ok(modified) = metadata.modified() else {
            return false;
        };
        match SystemTime::now().duration_since(modified) {
            Ok(age) => age < self.ttl,
            Err(_) => true,
        }
    }

    /// Serializes and atomically publishes an entry.
    fn write_entry(
        &self,
        date: NaiveDate,
        key: &CacheKey,
        payload: &ForecastPayload,
    ) -> Result<(), CacheError> {
        let dir = bucket_dir(&self.cache_dir, date);
        fs::create_dir_all(&dir)?;

        let final_path = dir.join(key.file_name());
        let tmp_path = final_path.with_extension("json.tmp");

        let bytes = serde_json::to_vec_pretty(payload)?;
        fs::write(&tmp_path, &bytes)?;
        fs::rename(&tmp_path, &final_path)?;
        Ok(())
    }

    /// True when even the newest possible write in the bucket (end of its
    /// day) has outlived the TTL, so the bucket can be dropped without
    /// per-entry inspection.
    fn bucket_fully_expired(&self, date: NaiveDate) -> bool {
        let Some(end_of_day) = date.succ_opt().and_then(|d| d.and_hms_opt(0, 0, 0)) else {
            return false;
        };
        let Ok(ttl) = chrono::Duration::from_std(self.ttl) else {
            return false;
        };
        Local::now().naive_local() - end_of_day > ttl
    }

    /// Removes individually expired entries from a bucket inside the TTL
    /// window.
    fn remove_expired_entries(&self, bucket_path: &Path) -> u64 {
        let mut removed = 0;
        for path in json_entries(bucket_path) {
            if !self.entry_valid(&path) && fs::remove_file(&path).is_ok() {
                removed += 1;
            }
        }
        removed
    }

    /// All entry files across all day buckets.
    fn walk_entries(&self) -> Vec<PathBuf> {
        let Ok(dir_entries) = fs::read_dir(&self.cache_dir) else {
            return Vec::new();
        };

        dir_entries
            .flatten()
            .filter(|e| e.path().is_dir())
            .filter(|e| {
                e.file_name()
                    .to_str()
                    .and_then(parse_bucket_date)
                    .is_some()
            })
            .flat_map(|e| json_entries(&e.path()))
            .collect()
    }
}

impl std::fmt::Debug for ForecastCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForecastCache")
            .field("cache_dir", &self.cache_dir)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

/// JSON entry files directly inside a bucket directory.
fn json_entries(bucket_path: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(bucket_path) else {
        return Vec::new();
    };
    entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("json"))
        .collect()
}

/// Removes every entry in a fully expired bucket, returning the count.
fn remove_bucket_entries(bucket_path: &Path) -> u64 {
    let mut removed = 0;
    for path in json_entries(bucket_path) {
        if fs::remove_file(&path).is_ok() {
            removed += 1;
        }
    }
    removed
}
