//! Admission queue core: submission surface and dispatch loop.
//!
//! One [`AdmissionQueue`] instance owns a bounded priority buffer, an
//! execution-slot pool, and a single background dispatch loop. Submitters
//! buffer work synchronously and await a single-use completion handle;
//! the loop pops requests in `(priority, sequence)` order, acquires a slot,
//! and spawns the task so executions overlap up to the concurrency limit
//! without blocking dispatch.

use super::buffer::RequestBuffer;
use super::config::QueueConfig;
use super::error::{ComputeError, QueueError};
use super::estimator::{estimate_wait, ExecutionWindow};
use super::request::{Priority, QueuedRequest};
use super::slots::{ExecutionSlots, SlotPermit};
use super::stats::{QueueStats, QueueStatistics};
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::{oneshot, Notify};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

// =============================================================================
// Admission Queue
// =============================================================================

/// Bounded-concurrency priority queue for expensive asynchronous work.
///
/// The queue knows nothing about forecasts or caches: a task is an opaque
/// pre-bound future producing `Result<T, ComputeError>`. Constructed once
/// at process start and passed around explicitly; never a global.
pub struct AdmissionQueue<T: Send + 'static> {
    config: QueueConfig,
    buffer: Arc<Mutex<RequestBuffer<T>>>,
    slots: Arc<ExecutionSlots>,
    stats: Arc<Mutex<QueueStats>>,
    window: Arc<Mutex<ExecutionWindow>>,
    work_notify: Arc<Notify>,
    shutdown: CancellationToken,
    worker: tokio::sync::Mutex<Option<JoinHandle<()>>>,
}

impl<T: Send + 'static> AdmissionQueue<T> {
    /// Creates a queue with the given configuration.
    ///
    /// The dispatch loop does not run until [`start`](Self::start) is called;
    /// requests submitted before that simply stay buffered.
    pub fn new(config: QueueConfig) -> Self {
        Self {
            buffer: Arc::new(Mutex::new(RequestBuffer::new(config.capacity))),
            slots: Arc::new(ExecutionSlots::new(config.concurrency_limit)),
            stats: Arc::new(Mutex::new(QueueStats::new())),
            window: Arc::new(Mutex::new(ExecutionWindow::new(config.window_size))),
            work_notify: Arc::new(Notify::new()),
            shutdown: CancellationToken::new(),
            worker: tokio::sync::Mutex::new(None),
            config,
        }
    }

    /// Launches the dispatch loop. Calling `start` twice is a no-op.
    pub async fn start(&self) {
        let mut worker = self.worker.lock().await;
        if worker.is_some() {
            return;
        }
        if self.shutdown.is_cancelled() {
            warn!("start() called on a stopped queue; ignoring");
            return;
        }

        let dispatch = DispatchLoop {
            buffer: Arc::clone(&self.buffer),
            slots: Arc::clone(&self.slots),
            stats: Arc::clone(&self.stats),
            window: Arc::clone(&self.window),
            work_notify: Arc::clone(&self.work_notify),
            shutdown: self.shutdown.clone(),
            poll_interval: self.config.poll_interval,
        };
        *worker = Some(tokio::spawn(dispatch.run()));

        info!(
            concurrency_limit = self.config.concurrency_limit,
            capacity = self.config.capacity,
            "admission queue started"
        );
    }

    /// Signals the dispatch loop to exit and waits for it to acknowledge.
    ///
    /// Buffered-but-not-started requests fail with [`QueueError::Shutdown`]
    /// rather than hang; in-flight tasks run to completion in the
    /// background. Idempotent, and terminal: a stopped queue cannot be
    /// restarted.
    pub async fn stop(&self) {
        let mut worker = self.worker.lock().await;
        self.shutdown.cancel();
        self.work_notify.notify_one();

        if let Some(handle) = worker.take() {
            let _ = handle.await;
        }

        // Covers requests buffered when the loop never ran.
        let drained = self.buffer.lock().unwrap().drain();
        for request in drained {
            request.reject(QueueError::Shutdown);
        }

        info!("admission queue stopped");
    }

    /// Buffers a request and returns its completion handle.
    ///
    /// Never suspends: a full buffer is rejected immediately with
    /// [`QueueError::Full`], and a stopped queue with
    /// [`QueueError::Shutdown`].
    pub fn submit(
        &self,
        id: impl Into<String>,
        priority: Priority,
        task: impl Future<Output = Result<T, ComputeError>> + Send + 'static,
    ) -> Result<RequestHandle<T>, QueueError> {
        let id = id.into();
        self.stats.lock().unwrap().record_submitted();

        if self.shutdown.is_cancelled() {
            warn!(request_id = %id, "request submitted to stopped queue");
            return Err(QueueError::Shutdown);
        }

        let (receiver, depth) = {
            let mut buffer = self.buffer.lock().unwrap();
            let receiver = buffer.push(id.clone(), priority, Box::pin(task));
            (receiver, buffer.len())
        };

        let Some(receiver) = receiver else {
            self.stats.lock().unwrap().record_rejected();
            warn!(
                request_id = %id,
                capacity = self.config.capacity,
                "request queue full, rejecting"
            );
            return Err(QueueError::Full {
                capacity: self.config.capacity,
            });
        };

        self.work_notify.notify_one();

        info!(
            request_id = %id,
            priority = %priority,
            depth,
            estimated_wait_ms = self.estimated_wait().as_millis() as u64,
            "request queued"
        );

        Ok(RequestHandle {
            id,
            receiver,
            timeout: self.config.timeout,
            stats: Arc::clone(&self.stats),
        })
    }

    /// Submits a request and waits for its completion, cancellation, or
    /// timeout. Equivalent to [`submit`](Self::submit) followed by
    /// [`RequestHandle::wait`].
    pub async fn enqueue(
        &self,
        id: impl Into<String>,
        priority: Priority,
        task: impl Future<Output = Result<T, ComputeError>> + Send + 'static,
    ) -> Result<T, QueueError> {
        self.submit(id, priority, task)?.wait().await
    }

    /// Expected wait for a request submitted now. Pure read, zero when
    /// the buffer is empty.
    pub fn estimated_wait(&self) -> Duration {
        let depth = self.buffer.lock().unwrap().len();
        let avg = self.window.lock().unwrap().average();
        estimate_wait(depth, self.config.concurrency_limit, avg)
    }

    /// Number of requests currently buffered.
    pub fn depth(&self) -> usize {
        self.buffer.lock().unwrap().len()
    }

    /// Number of tasks currently executing.
    pub fn in_flight(&self) -> usize {
        self.slots.in_flight()
    }

    /// Read-only snapshot of counters and current state.
    pub fn stats(&self) -> QueueStatistics {
        let stats = self.stats.lock().unwrap().clone();
        QueueStatistics {
            depth: self.depth(),
            in_flight: self.slots.in_flight(),
            peak_in_flight: self.slots.peak_in_flight(),
            capacity: self.config.capacity,
            concurrency_limit: self.config.concurrency_limit,
            success_rate_percent: stats.success_rate() * 100.0,
            estimated_wait: self.estimated_wait(),
            stats,
        }
    }

    /// Zeroes counters and the execution-time window.
    pub fn reset_metrics(&self) {
        self.stats.lock().unwrap().reset();
        self.window.lock().unwrap().clear();
    }
}

impl<T: Send + 'static> std::fmt::Debug for AdmissionQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdmissionQueue")
            .field("depth", &self.depth())
            .field("in_flight", &self.slots.in_flight())
            .field("capacity", &self.config.capacity)
            .field("concurrency_limit", &self.config.concurrency_limit)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Request Handle
// =============================================================================

/// Completion handle returned by [`AdmissionQueue::submit`].
///
/// Awaiting [`wait`](Self::wait) suspends the caller until the task
/// completes or the configured deadline elapses. A timed-out request's
/// eventual result is discarded; the task's slot is still reclaimed when
/// it finishes.
pub struct RequestHandle<T> {
    id: String,
    receiver: oneshot::Receiver<Result<T, QueueError>>,
    timeout: Duration,
    stats: Arc<Mutex<QueueStats>>,
}

impl<T> RequestHandle<T> {
    /// The caller-supplied request id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Waits for the request to complete, fail, or time out.
    pub async fn wait(self) -> Result<T, QueueError> {
        match tokio::time::timeout(self.timeout, self.receiver).await {
            Ok(Ok(result)) => result,
            // Sender dropped without a result: the queue went away.
            Ok(Err(_)) => Err(QueueError::Shutdown),
            Err(_) => {
                self.stats.lock().unwrap().record_timed_out();
                error!(
                    request_id = %self.id,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "request timed out"
                );
                Err(QueueError::Timeout {
                    timeout: self.timeout,
                })
            }
        }
    }
}

impl<T> std::fmt::Debug for RequestHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestHandle")
            .field("id", &self.id)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Dispatch Loop
// =============================================================================

/// The background scheduler: pops buffered requests in priority order,
/// acquires an execution slot, and spawns the task.
struct DispatchLoop<T: Send + 'static> {
    buffer: Arc<Mutex<RequestBuffer<T>>>,
    slots: Arc<ExecutionSlots>,
    stats: Arc<Mutex<QueueStats>>,
    window: Arc<Mutex<ExecutionWindow>>,
    work_notify: Arc<Notify>,
    shutdown: CancellationToken,
    poll_interval: Duration,
}

impl<T: Send + 'static> DispatchLoop<T> {
    /// Runs until shutdown is signalled, then fails whatever is still
    /// buffered with a shutdown error.
    async fn run(self) {
        debug!("dispatch loop started");

        loop {
            if self.shutdown.is_cancelled() {
                break;
            }

            let next = self.buffer.lock().unwrap().pop();
            let Some(request) = next else {
                // Idle: wake on new work, shutdown, or a short poll tick.
                tokio::select! {
                    _ = self.shutdown.cancelled() => break,
                    _ = self.work_notify.notified() => {}
                    _ = tokio::time::sleep(self.poll_interval) => {}
                }
                continue;
            };

            let permit = tokio::select! {
                _ = self.shutdown.cancelled() => {
                    request.reject(QueueError::Shutdown);
                    break;
                }
                permit = self.slots.acquire() => permit,
            };

            self.spawn_execution(request, permit);
        }

        let drained = self.buffer.lock().unwrap().drain();
        if !drained.is_empty() {
            info!(
                drained = drained.len(),
                "rejecting buffered requests at shutdown"
            );
            for request in drained {
                request.reject(QueueError::Shutdown);
            }
        }

        debug!("dispatch loop stopped");
    }

    /// Spawns a popped request so the loop can keep dispatching while it
    /// executes. The slot permit moves into the spawned future and is
    /// released on drop, even if the submitter has already timed out.
    fn spawn_execution(&self, request: QueuedRequest<T>, permit: SlotPermit) {
        let stats = Arc::clone(&self.stats);
        let window = Arc::clone(&self.window);
        let work_notify = Arc::clone(&self.work_notify);
        let in_flight = self.slots.in_flight();

        let QueuedRequest {
            id,
            task,
            enqueued_at,
            result_tx,
            ..
        } = request;

        tokio::spawn(async move {
            let wait = enqueued_at.elapsed();
            stats.lock().unwrap().record_wait(wait);

            debug!(
                request_id = %id,
                wait_ms = wait.as_millis() as u64,
                in_flight,
                "executing request"
            );

            let started = Instant::now();
            let outcome = task.await;
            let execution = started.elapsed();

            match outcome {
                Ok(value) => {
                    stats.lock().unwrap().record_completed(execution);
                    window.lock().unwrap().record(execution);
                    info!(
                        request_id = %id,
                        execution_ms = execution.as_millis() as u64,
                        total_ms = (wait + execution).as_millis() as u64,
                        "request completed"
                    );
                    // Send fails if the caller timed out; the result is
                    // discarded and the slot still released below.
                    let _ = result_tx.send(Ok(value));
                }
                Err(cause) => {
                    stats.lock().unwrap().record_failed();
                    error!(request_id = %id, error = %cause, "request failed");
                    let _ = result_tx.send(Err(QueueError::Compute(cause)));
                }
            }

            drop(permit);
            work_notify.notify_one();
        });
    }
}
