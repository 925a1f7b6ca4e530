//! Settings structs for the admission queue and result cache.

use crate::cache::{CacheConfig, DEFAULT_TTL};
use crate::queue::{
    QueueConfig, DEFAULT_CAPACITY, DEFAULT_CONCURRENCY_LIMIT, DEFAULT_POLL_INTERVAL,
    DEFAULT_TIMEOUT, DEFAULT_WINDOW_SIZE,
};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid queue settings: {0}")]
    InvalidQueue(String),

    #[error("invalid cache settings: {0}")]
    InvalidCache(String),
}

/// Admission queue settings.
#[derive(Debug, Clone)]
pub struct QueueSettings {
    /// Maximum simultaneously executing forecast computations.
    /// Default: 2.
    pub max_concurrent: usize,
    /// Maximum buffered requests before hard rejection.
    /// Default: 100.
    pub max_queue_size: usize,
    /// Deadline for a request's combined wait + execution time.
    /// Default: 600 seconds.
    pub timeout: Duration,
    /// Idle poll interval of the dispatch loop.
    /// Default: 1 second.
    pub poll_interval: Duration,
    /// Rolling-window size for the wait estimator.
    /// Default: 10.
    pub recent_window: usize,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            max_concurrent: DEFAULT_CONCURRENCY_LIMIT,
            max_queue_size: DEFAULT_CAPACITY,
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            recent_window: DEFAULT_WINDOW_SIZE,
        }
    }
}

impl QueueSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent == 0 {
            return Err(ConfigError::InvalidQueue(
                "max_concurrent must be at least 1".to_string(),
            ));
        }
        if self.max_queue_size == 0 {
            return Err(ConfigError::InvalidQueue(
                "max_queue_size must be at least 1".to_string(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidQueue(
                "timeout must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl From<&QueueSettings> for QueueConfig {
    fn from(settings: &QueueSettings) -> Self {
        QueueConfig {
            concurrency_limit: settings.max_concurrent,
            capacity: settings.max_queue_size,
            timeout: settings.timeout,
            poll_interval: settings.poll_interval,
            window_size: settings.recent_window,
        }
    }
}

/// Result cache settings.
#[derive(Debug, Clone)]
pub struct CacheSettings {
    /// Cache root directory. Default: platform cache dir under
    /// `agrocast/forecasts`.
    pub directory: PathBuf,
    /// Entry time-to-live. Default: 24 hours.
    pub ttl: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        let defaults = CacheConfig::default();
        Self {
            directory: defaults.cache_dir,
            ttl: DEFAULT_TTL,
        }
    }
}

impl CacheSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.ttl.is_zero() {
            return Err(ConfigError::InvalidCache(
                "ttl must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl From<&CacheSettings> for CacheConfig {
    fn from(settings: &CacheSettings) -> Self {
        CacheConfig {
            cache_dir: settings.directory.clone(),
            ttl: settings.ttl,
        }
    }
}

/// Complete settings for the forecast service.
#[derive(Debug, Clone, Default)]
pub struct ServiceSettings {
    pub queue: QueueSettings,
    pub cache: CacheSettings,
}

impl ServiceSettings {
    /// Validates every section. Called once at service construction.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.queue.validate()?;
        self.cache.validate()?;
        Ok(())
    }
}
