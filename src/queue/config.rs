//! Admission queue configuration.

use super::estimator::DEFAULT_WINDOW_SIZE;
use std::time::Duration;

/// Default number of simultaneously executing tasks.
pub const DEFAULT_CONCURRENCY_LIMIT: usize = 2;

/// Default buffer capacity (hard rejection beyond this).
pub const DEFAULT_CAPACITY: usize = 100;

/// Default per-request deadline covering wait + execution.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

/// Default idle poll interval for the dispatch loop.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Configuration for an [`AdmissionQueue`](super::AdmissionQueue).
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Maximum simultaneously executing tasks.
    pub concurrency_limit: usize,
    /// Maximum buffered requests; submission beyond this is rejected.
    pub capacity: usize,
    /// Deadline for a request's combined wait + execution time.
    pub timeout: Duration,
    /// How often the idle dispatch loop wakes to check for shutdown.
    pub poll_interval: Duration,
    /// Rolling-window size feeding the wait estimator.
    pub window_size: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
            capacity: DEFAULT_CAPACITY,
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }
}

impl QueueConfig {
    /// Set the concurrency limit.
    pub fn with_concurrency_limit(mut self, limit: usize) -> Self {
        self.concurrency_limit = limit;
        self
    }

    /// Set the buffer capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the per-request deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = QueueConfig::default();
        assert_eq!(config.concurrency_limit, 2);
        assert_eq!(config.capacity, 100);
        assert_eq!(config.timeout, Duration::from_secs(600));
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert_eq!(config.window_size, 10);
    }

    #[test]
    fn builder_overrides() {
        let config = QueueConfig::default()
            .with_concurrency_limit(4)
            .with_capacity(8)
            .with_timeout(Duration::from_secs(30));

        assert_eq!(config.concurrency_limit, 4);
        assert_eq!(config.capacity, 8);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }
}
