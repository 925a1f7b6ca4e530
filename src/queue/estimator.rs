//! Wait-time estimation from recent execution history.
//!
//! The dispatch loop records each completed execution into a bounded
//! rolling window; [`estimate_wait`] turns queue depth and the window's
//! average into an expected wait for a newly submitted request.

use std::collections::VecDeque;
use std::time::Duration;

/// Number of recent executions retained by default.
pub const DEFAULT_WINDOW_SIZE: usize = 10;

/// Execution-time estimate used before any history exists.
pub const DEFAULT_EXECUTION_ESTIMATE: Duration = Duration::from_secs(5);

/// Bounded rolling window of recent execution durations.
#[derive(Debug)]
pub struct ExecutionWindow {
    samples: VecDeque<Duration>,
    max_samples: usize,
}

impl ExecutionWindow {
    /// Creates a window holding at most `max_samples` entries.
    pub fn new(max_samples: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(max_samples),
            max_samples: max_samples.max(1),
        }
    }

    /// Records an execution duration, evicting the oldest sample if full.
    pub fn record(&mut self, duration: Duration) {
        if self.samples.len() == self.max_samples {
            self.samples.pop_front();
        }
        self.samples.push_back(duration);
    }

    /// Average of the retained samples, `None` when empty.
    pub fn average(&self) -> Option<Duration> {
        if self.samples.is_empty() {
            return None;
        }
        let total: Duration = self.samples.iter().sum();
        Some(total / self.samples.len() as u32)
    }

    /// Number of retained samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Discards all samples.
    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

impl Default for ExecutionWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_SIZE)
    }
}

/// Estimates the wait for a newly submitted request.
///
/// `depth / concurrency_limit * avg_execution`, zero for an empty queue.
/// `avg_execution` falls back to [`DEFAULT_EXECUTION_ESTIMATE`] when no
/// history is available.
pub fn estimate_wait(
    depth: usize,
    concurrency_limit: usize,
    avg_execution: Option<Duration>,
) -> Duration {
    if depth == 0 {
        return Duration::ZERO;
    }

    let avg = avg_execution.unwrap_or(DEFAULT_EXECUTION_ESTIMATE);
    let scale = depth as f64 / concurrency_limit.max(1) as f64;
    Duration::from_secs_f64(avg.as_secs_f64() * scale)
}
