//! Integration tests for the admission queue.
//!
//! These tests verify the queue's externally observable guarantees:
//! - Dispatch start order is a stable sort by (priority, enqueue order)
//! - In-flight executions never exceed the concurrency limit
//! - A full buffer rejects exactly the overflow submissions
//! - Timeouts release callers while slots are still reclaimed
//! - Shutdown fails buffered requests instead of hanging them

use agrocast::queue::{AdmissionQueue, ComputeError, Priority, QueueConfig, QueueError};
use futures::future::join_all;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// =============================================================================
// Test Helpers
// =============================================================================

/// Records the label of each task in the order executions start.
type StartOrder = Arc<Mutex<Vec<&'static str>>>;

fn recording_task(
    label: &'static str,
    order: StartOrder,
    delay: Duration,
) -> impl std::future::Future<Output = Result<&'static str, ComputeError>> + Send + 'static {
    async move {
        order.lock().unwrap().push(label);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(label)
    }
}

// =============================================================================
// Integration Tests
// =============================================================================

#[tokio::test]
async fn dispatch_order_is_stable_sort_by_priority_then_fifo() {
    let config = QueueConfig::default()
        .with_concurrency_limit(1)
        .with_capacity(10)
        .with_timeout(Duration::from_secs(5));
    let queue: AdmissionQueue<&'static str> = AdmissionQueue::new(config);

    let order: StartOrder = Arc::new(Mutex::new(Vec::new()));

    // Buffer everything before the loop starts so enqueue order is exact.
    let submissions = [
        ("low-1", Priority::Low),
        ("high-1", Priority::High),
        ("normal-1", Priority::Normal),
        ("high-2", Priority::High),
        ("low-2", Priority::Low),
        ("normal-2", Priority::Normal),
    ];
    let handles: Vec<_> = submissions
        .iter()
        .map(|&(label, priority)| {
            queue
                .submit(
                    label,
                    priority,
                    recording_task(label, Arc::clone(&order), Duration::ZERO),
                )
                .unwrap()
        })
        .collect();

    queue.start().await;
    for result in join_all(handles.into_iter().map(|h| h.wait())).await {
        result.unwrap();
    }

    let started = order.lock().unwrap().clone();
    assert_eq!(
        started,
        ["high-1", "high-2", "normal-1", "normal-2", "low-1", "low-2"]
    );

    queue.stop().await;
}

#[tokio::test]
async fn in_flight_never_exceeds_concurrency_limit() {
    let config = QueueConfig::default()
        .with_concurrency_limit(2)
        .with_capacity(20)
        .with_timeout(Duration::from_secs(5));
    let queue: AdmissionQueue<usize> = AdmissionQueue::new(config);
    queue.start().await;

    let current = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let mut waiters = Vec::new();
    for i in 0..10 {
        let current = Arc::clone(&current);
        let peak = Arc::clone(&peak);
        let handle = queue
            .submit(format!("bounded-{i}"), Priority::Normal, async move {
                let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(50)).await;
                current.fetch_sub(1, Ordering::SeqCst);
                Ok(i)
            })
            .unwrap();
        waiters.push(handle.wait());
    }

    for result in join_all(waiters).await {
        result.unwrap();
    }

    assert!(peak.load(Ordering::SeqCst) <= 2);
    assert_eq!(peak.load(Ordering::SeqCst), 2);
    assert!(queue.stats().peak_in_flight <= 2);

    queue.stop().await;
}

#[tokio::test]
async fn overflow_submission_is_the_only_rejection() {
    let config = QueueConfig::default()
        .with_concurrency_limit(2)
        .with_capacity(5)
        .with_timeout(Duration::from_secs(5));
    let queue: AdmissionQueue<&'static str> = AdmissionQueue::new(config);

    let order: StartOrder = Arc::new(Mutex::new(Vec::new()));

    // Six submissions against capacity 5, all before dispatch starts:
    // exactly the sixth is rejected.
    let submissions = [
        ("low-1", Priority::Low),
        ("high-1", Priority::High),
        ("normal-1", Priority::Normal),
        ("high-2", Priority::High),
        ("low-2", Priority::Low),
        ("normal-2", Priority::Normal),
    ];

    let mut handles = Vec::new();
    let mut rejections = 0;
    for (label, priority) in submissions {
        match queue.submit(
            label,
            priority,
            recording_task(label, Arc::clone(&order), Duration::from_millis(100)),
        ) {
            Ok(handle) => handles.push(handle),
            Err(QueueError::Full { capacity }) => {
                assert_eq!(capacity, 5);
                rejections += 1;
            }
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }
    assert_eq!(rejections, 1);
    assert_eq!(handles.len(), 5);

    queue.start().await;
    for result in join_all(handles.into_iter().map(|h| h.wait())).await {
        result.unwrap();
    }

    // The two HIGH requests form the first wave of two.
    let started = order.lock().unwrap().clone();
    assert_eq!(started.len(), 5);
    assert!(started[..2].contains(&"high-1"));
    assert!(started[..2].contains(&"high-2"));

    let snapshot = queue.stats();
    assert_eq!(snapshot.stats.submitted, 6);
    assert_eq!(snapshot.stats.rejected, 1);
    assert_eq!(snapshot.stats.completed, 5);

    queue.stop().await;
}

#[tokio::test]
async fn timed_out_caller_is_released_before_the_task_finishes() {
    let config = QueueConfig::default()
        .with_concurrency_limit(1)
        .with_capacity(10)
        .with_timeout(Duration::from_millis(150));
    let queue: AdmissionQueue<&'static str> = AdmissionQueue::new(config);
    queue.start().await;

    let finished = Arc::new(AtomicUsize::new(0));
    let finished_clone = Arc::clone(&finished);

    let started_at = std::time::Instant::now();
    let result = queue
        .enqueue("sluggish", Priority::Normal, async move {
            tokio::time::sleep(Duration::from_millis(600)).await;
            finished_clone.fetch_add(1, Ordering::SeqCst);
            Ok("late")
        })
        .await;

    // Caller is released at the deadline, not at task completion.
    assert!(matches!(result, Err(QueueError::Timeout { .. })));
    assert!(started_at.elapsed() < Duration::from_millis(500));
    assert_eq!(finished.load(Ordering::SeqCst), 0);

    // The abandoned task still completes and frees its slot.
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(finished.load(Ordering::SeqCst), 1);
    assert_eq!(queue.in_flight(), 0);

    let follow_up = queue
        .enqueue("prompt", Priority::Normal, async { Ok("done") })
        .await;
    assert_eq!(follow_up.unwrap(), "done");

    queue.stop().await;
}

#[tokio::test]
async fn stop_fails_buffered_requests_with_shutdown() {
    let config = QueueConfig::default()
        .with_concurrency_limit(1)
        .with_capacity(10)
        .with_timeout(Duration::from_secs(5));
    let queue: AdmissionQueue<&'static str> = AdmissionQueue::new(config);

    let order: StartOrder = Arc::new(Mutex::new(Vec::new()));
    let handles: Vec<_> = (0..3)
        .map(|i| {
            let labels = ["pending-1", "pending-2", "pending-3"];
            queue
                .submit(
                    labels[i],
                    Priority::Normal,
                    recording_task(labels[i], Arc::clone(&order), Duration::ZERO),
                )
                .unwrap()
        })
        .collect();

    // Loop never started: stop must fail them rather than hang.
    queue.stop().await;

    for result in join_all(handles.into_iter().map(|h| h.wait())).await {
        assert!(matches!(result, Err(QueueError::Shutdown)));
    }
    assert!(order.lock().unwrap().is_empty());
}

#[tokio::test]
async fn estimator_tracks_recent_executions() {
    let config = QueueConfig::default()
        .with_concurrency_limit(1)
        .with_capacity(10)
        .with_timeout(Duration::from_secs(5));
    let queue: AdmissionQueue<&'static str> = AdmissionQueue::new(config);
    queue.start().await;

    // Empty queue estimates zero regardless of history.
    assert_eq!(queue.estimated_wait(), Duration::ZERO);

    for i in 0..3 {
        queue
            .enqueue(format!("warmup-{i}"), Priority::Normal, async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok("ok")
            })
            .await
            .unwrap();
    }

    let snapshot = queue.stats();
    assert_eq!(snapshot.stats.completed, 3);
    assert!(snapshot.stats.avg_execution() >= Duration::from_millis(45));
    assert!(snapshot.success_rate_percent > 99.0);

    queue.stop().await;
}
