//! Cache errors and configuration.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Default time-to-live for cached forecasts (24 hours).
pub const DEFAULT_TTL: Duration = Duration::from_secs(86_400);

/// Cache-related errors.
///
/// These never propagate past the service boundary: a write failure
/// degrades to "not cached" and a read failure to "cache miss".
#[derive(Debug, Error)]
pub enum CacheError {
    /// I/O error during cache operations.
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Payload could not be serialized.
    #[error("cache serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result cache configuration.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Root directory holding the per-day bucket subdirectories.
    pub cache_dir: PathBuf,
    /// Maximum entry age before it is treated as absent.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        let cache_dir = dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("agrocast")
            .join("forecasts");

        Self {
            cache_dir,
            ttl: DEFAULT_TTL,
        }
    }
}

impl CacheConfig {
    /// Set the cache root directory.
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    /// Set the entry time-to-live.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}
