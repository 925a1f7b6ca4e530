//! Admission queue error taxonomy.
//!
//! Queue-level failures (capacity, timeout, shutdown) are distinct variants
//! from task-level failures ([`ComputeError`]), so callers can map them to
//! differentiated responses.

use std::time::Duration;
use thiserror::Error;

/// Error raised by the compute task itself.
///
/// Wraps the collaborator's failure with its original cause preserved for
/// diagnostics. The queue reports this verbatim as a failed completion; its
/// own counters record it as "failed", not "rejected".
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ComputeError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ComputeError {
    /// Creates a compute error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a compute error wrapping an underlying cause.
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Errors surfaced by [`AdmissionQueue`](super::AdmissionQueue) submission.
#[derive(Debug, Error)]
pub enum QueueError {
    /// The buffer already holds `capacity` requests. Never retried
    /// internally; callers should shed load or retry later.
    #[error("request queue is at capacity ({capacity}); try again later")]
    Full { capacity: usize },

    /// Combined wait + execution time exceeded the configured ceiling.
    /// The in-flight task (if any) is abandoned from the caller's
    /// perspective but still reclaims its slot on eventual completion.
    #[error("request timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    /// The queue was stopped before the request could execute.
    #[error("queue is shutting down; request was not executed")]
    Shutdown,

    /// The task itself failed.
    #[error("forecast computation failed: {0}")]
    Compute(#[from] ComputeError),
}

impl QueueError {
    /// Returns true for queue-level failures (as opposed to task failures).
    pub fn is_queue_level(&self) -> bool {
        !matches!(self, Self::Compute(_))
    }
}
