//! Day-bucket path layout.
//!
//! The cache root holds one subdirectory per calendar day (`YYYY-MM-DD`),
//! each containing one JSON file per cache key. Bucketing by day keeps the
//! TTL sweep cheap (whole buckets can often be dropped without per-entry
//! inspection) at the cost of checking two buckets on reads near a day
//! boundary.

use super::key::CacheKey;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// Date format used for bucket directory names.
const BUCKET_FORMAT: &str = "%Y-%m-%d";

/// Directory name for a bucket date.
pub fn bucket_name(date: NaiveDate) -> String {
    date.format(BUCKET_FORMAT).to_string()
}

/// Bucket directory for a date.
pub fn bucket_dir(root: &Path, date: NaiveDate) -> PathBuf {
    root.join(bucket_name(date))
}

/// Full path of a key's entry within a date bucket.
pub fn entry_path(root: &Path, date: NaiveDate, key: &CacheKey) -> PathBuf {
    bucket_dir(root, date).join(key.file_name())
}

/// Parses a bucket directory name back to its date.
///
/// Returns `None` for directories that are not day buckets, which the
/// sweep skips.
pub fn parse_bucket_date(name: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(name, BUCKET_FORMAT).ok()
}

/// The dates probed on read: today's bucket and the immediately preceding
/// one, to tolerate entries written just before a day rolled over.
pub fn probe_dates(today: NaiveDate) -> [NaiveDate; 2] {
    [today, today.pred_opt().unwrap_or(today)]
}
