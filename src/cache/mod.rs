//! TTL-based result cache for forecast payloads.
//!
//! File-backed storage bucketed by calendar day, keyed by a coarse
//! spatial + horizon fingerprint. The cache is an optimization, never a
//! correctness dependency: every failure mode degrades to a miss.

mod key;
mod path;
mod stats;
mod store;
mod types;

pub use key::CacheKey;
pub use stats::{CacheStatistics, CacheStats};
pub use store::ForecastCache;
pub use types::{CacheConfig, CacheError, DEFAULT_TTL};

// Re-export path utilities for convenience
pub use path::{bucket_dir, bucket_name, entry_path, parse_bucket_date, probe_dates};
