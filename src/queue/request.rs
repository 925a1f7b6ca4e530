//! Queued request types and ordering.
//!
//! A [`QueuedRequest`] pairs an opaque unit of deferred work with its
//! priority class, caller-supplied id, and a single-use completion channel.
//! Ordering is `(priority, sequence)` ascending: lower priority ordinal
//! first, strict FIFO within a class.

use super::error::{ComputeError, QueueError};
use futures::future::BoxFuture;
use std::cmp::Ordering;
use std::time::Instant;
use tokio::sync::oneshot;

/// Priority classes for queued requests. Lower ordinal is served first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Priority {
    /// High-priority callers, served before everything else.
    High = 1,
    /// Standard requests.
    Normal = 2,
    /// Background work (e.g., precomputation).
    Low = 3,
}

impl Priority {
    /// Numeric ordinal used for ordering and logging.
    pub fn ordinal(&self) -> u8 {
        *self as u8
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "HIGH"),
            Self::Normal => write!(f, "NORMAL"),
            Self::Low => write!(f, "LOW"),
        }
    }
}

/// The opaque task a request carries: a pre-bound asynchronous computation
/// producing either the payload or a compute failure. The queue never
/// inspects its contents.
pub type RequestTask<T> = BoxFuture<'static, Result<T, ComputeError>>;

/// A request buffered in the admission queue.
///
/// Ownership of the task is exclusive to the request until execution
/// starts. Exactly one of value/error is written to `result_tx`, exactly
/// once: the oneshot channel enforces single-write semantics, so a late
/// completion after caller timeout is silently discarded.
pub struct QueuedRequest<T> {
    /// Caller-supplied identifier, used for tracing.
    pub id: String,
    /// Priority class.
    pub priority: Priority,
    /// The deferred work.
    pub task: RequestTask<T>,
    /// When the request entered the buffer, for wait-time accounting.
    pub enqueued_at: Instant,
    /// Monotonic sequence number: FIFO tie-break within a priority class.
    pub sequence: u64,
    /// Single-use completion handle the submitter awaits.
    pub result_tx: oneshot::Sender<Result<T, QueueError>>,
}

impl<T> QueuedRequest<T> {
    /// Fails the request without executing it (e.g., on shutdown).
    ///
    /// The send is best-effort: the caller may already have timed out.
    pub fn reject(self, error: QueueError) {
        let _ = self.result_tx.send(Err(error));
    }
}

impl<T> PartialEq for QueuedRequest<T> {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.sequence == other.sequence
    }
}

impl<T> Eq for QueuedRequest<T> {}

impl<T> PartialOrd for QueuedRequest<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for QueuedRequest<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap: reverse both comparisons so the lowest
        // (priority, sequence) pair pops first.
        match other.priority.cmp(&self.priority) {
            Ordering::Equal => other.sequence.cmp(&self.sequence),
            ordering => ordering,
        }
    }
}

impl<T> std::fmt::Debug for QueuedRequest<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueuedRequest")
            .field("id", &self.id)
            .field("priority", &self.priority)
            .field("sequence", &self.sequence)
            .finish_non_exhaustive()
    }
}
