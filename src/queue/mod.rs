//! Admission queue for expensive forecast computations.
//!
//! Limits how many expensive operations run simultaneously and orders
//! waiting work by priority, so a burst of requests cannot exhaust memory
//! or CPU. The queue is generic over the task's output type and has no
//! knowledge of forecasts, caches, or models.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                    AdmissionQueue                       │
//! │  submit / enqueue, start / stop, stats, estimated_wait  │
//! ├─────────────────────────────────────────────────────────┤
//! │                     DispatchLoop                        │
//! │  pop by (priority, sequence) → acquire slot → spawn     │
//! ├──────────────┬───────────────────┬──────────────────────┤
//! │ RequestBuffer│  ExecutionSlots   │ QueueStats +         │
//! │ (bounded     │  (semaphore with  │ ExecutionWindow      │
//! │  priority    │   in-flight/peak  │ (counters + wait     │
//! │  heap)       │   gauges)         │  estimator)          │
//! └──────────────┴───────────────────┴──────────────────────┘
//! ```
//!
//! # Ordering and backpressure
//!
//! - Dispatch start order is a stable sort by `(priority, enqueue
//!   sequence)`; completion order is unconstrained once executions
//!   overlap.
//! - A full buffer is a hard, immediate rejection, never unbounded
//!   queuing.
//! - `in_flight` never exceeds the configured concurrency limit; the slot
//!   semaphore is the only synchronization between executions.
//!
//! # Example
//!
//! ```ignore
//! use agrocast::queue::{AdmissionQueue, Priority, QueueConfig};
//!
//! let queue = AdmissionQueue::new(QueueConfig::default());
//! queue.start().await;
//!
//! let payload = queue
//!     .enqueue("forecast-18.52-73.86-1", Priority::Normal, async move {
//!         run_inference(lat, lon, horizon).await
//!     })
//!     .await?;
//!
//! queue.stop().await;
//! ```

mod buffer;
mod config;
mod core;
mod error;
mod estimator;
mod request;
mod slots;
mod stats;

pub use config::{
    QueueConfig, DEFAULT_CAPACITY, DEFAULT_CONCURRENCY_LIMIT, DEFAULT_POLL_INTERVAL,
    DEFAULT_TIMEOUT,
};
pub use self::core::{AdmissionQueue, RequestHandle};
pub use error::{ComputeError, QueueError};
pub use estimator::{
    estimate_wait, ExecutionWindow, DEFAULT_EXECUTION_ESTIMATE, DEFAULT_WINDOW_SIZE,
};
pub use request::{Priority, QueuedRequest, RequestTask};
pub use slots::{ExecutionSlots, SlotPermit};
pub use stats::{QueueStatistics, QueueStats};
