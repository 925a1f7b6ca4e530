//! Bounded priority buffer.
//!
//! Holds requests between submission and dispatch. A full buffer is a hard
//! rejection at submission time, never silent blocking past the bound.

use super::request::{Priority, QueuedRequest, RequestTask};
use std::collections::BinaryHeap;
use std::time::Instant;
use tokio::sync::oneshot;

/// Priority-ordered request buffer with a hard capacity bound.
///
/// Not internally synchronized; the owning queue wraps it in a mutex.
pub(crate) struct RequestBuffer<T> {
    heap: BinaryHeap<QueuedRequest<T>>,
    capacity: usize,
    /// Monotonic counter assigning the FIFO tie-break sequence.
    next_sequence: u64,
}

impl<T> RequestBuffer<T> {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity),
            capacity,
            next_sequence: 0,
        }
    }

    /// Buffers a request, returning its completion receiver.
    ///
    /// Returns `None` without buffering when the capacity bound is reached.
    pub(crate) fn push(
        &mut self,
        id: String,
        priority: Priority,
        task: RequestTask<T>,
    ) -> Option<oneshot::Receiver<Result<T, super::QueueError>>> {
        if self.heap.len() >= self.capacity {
            return None;
        }

        let (result_tx, result_rx) = oneshot::channel();
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        self.heap.push(QueuedRequest {
            id,
            priority,
            task,
            enqueued_at: Instant::now(),
            sequence,
            result_tx,
        });

        Some(result_rx)
    }

    /// Removes and returns the highest-priority, earliest-enqueued request.
    pub(crate) fn pop(&mut self) -> Option<QueuedRequest<T>> {
        self.heap.pop()
    }

    /// Drains every buffered request (used at shutdown).
    pub(crate) fn drain(&mut self) -> Vec<QueuedRequest<T>> {
        self.heap.drain().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
