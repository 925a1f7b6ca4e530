//! Queue statistics tracking and reporting.

use std::time::Duration;

/// Mutable queue counters, updated by the dispatch loop and submitters.
#[derive(Debug, Clone, Default)]
pub struct QueueStats {
    /// Requests ever submitted (including rejected ones).
    pub submitted: u64,
    /// Requests whose task completed successfully.
    pub completed: u64,
    /// Requests whose task returned an error.
    pub failed: u64,
    /// Requests whose caller hit the deadline.
    pub timed_out: u64,
    /// Requests rejected at submission because the buffer was full.
    pub rejected: u64,
    /// Sum of time spent buffered, across dispatched requests.
    pub total_wait: Duration,
    /// Sum of task execution time, across completed requests.
    pub total_execution: Duration,
}

impl QueueStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_submitted(&mut self) {
        self.submitted += 1;
    }

    pub fn record_rejected(&mut self) {
        self.rejected += 1;
    }

    pub fn record_timed_out(&mut self) {
        self.timed_out += 1;
    }

    pub fn record_wait(&mut self, wait: Duration) {
        self.total_wait += wait;
    }

    pub fn record_completed(&mut self, execution: Duration) {
        self.completed += 1;
        self.total_execution += execution;
    }

    pub fn record_failed(&mut self) {
        self.failed += 1;
    }

    /// Fraction of submitted requests that completed successfully (0-1).
    pub fn success_rate(&self) -> f64 {
        if self.submitted == 0 {
            0.0
        } else {
            self.completed as f64 / self.submitted as f64
        }
    }

    /// Average buffered wait across dispatched requests.
    pub fn avg_wait(&self) -> Duration {
        let dispatched = self.completed + self.failed;
        if dispatched == 0 {
            Duration::ZERO
        } else {
            self.total_wait / dispatched as u32
        }
    }

    /// Average execution time across completed requests.
    pub fn avg_execution(&self) -> Duration {
        if self.completed == 0 {
            Duration::ZERO
        } else {
            self.total_execution / self.completed as u32
        }
    }

    /// Zeroes all counters.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Read-only snapshot of queue state for monitoring.
#[derive(Debug, Clone)]
pub struct QueueStatistics {
    /// Counter values at snapshot time.
    pub stats: QueueStats,
    /// Requests currently buffered.
    pub depth: usize,
    /// Tasks currently executing.
    pub in_flight: usize,
    /// Highest in-flight count observed.
    pub peak_in_flight: usize,
    /// Configured buffer capacity.
    pub capacity: usize,
    /// Configured concurrency limit.
    pub concurrency_limit: usize,
    /// Success rate as a percentage (0-100).
    pub success_rate_percent: f64,
    /// Expected wait for a request submitted now.
    pub estimated_wait: Duration,
}
