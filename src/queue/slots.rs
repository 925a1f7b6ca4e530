//! Execution-slot pool.
//!
//! A semaphore-backed capacity limiter for concurrently executing tasks.
//! The pool does not handle priority; ordering is the buffer's concern.
//! The pool only answers "how many tasks may run at once".

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Pool of execution slots bounding in-flight task count.
#[derive(Debug)]
pub struct ExecutionSlots {
    semaphore: Arc<Semaphore>,
    capacity: usize,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
}

impl ExecutionSlots {
    /// Creates a pool with the given number of slots.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be > 0");
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Acquires a slot, waiting until one is available.
    ///
    /// The returned permit is owned so it can move into a spawned task;
    /// the slot is released when the permit drops (RAII), which is how a
    /// task that outlives its caller's deadline still reclaims its slot.
    pub async fn acquire(&self) -> SlotPermit {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .expect("slot semaphore closed unexpectedly");

        let current = self.in_flight.fetch_add(1, Ordering::Relaxed) + 1;
        self.update_peak(current);

        SlotPermit {
            _permit: permit,
            in_flight: Arc::clone(&self.in_flight),
        }
    }

    fn update_peak(&self, current: usize) {
        let mut peak = self.peak_in_flight.load(Ordering::Relaxed);
        while current > peak {
            match self.peak_in_flight.compare_exchange_weak(
                peak,
                current,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(p) => peak = p,
            }
        }
    }

    /// Total number of slots.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of tasks currently holding a slot.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Highest in-flight count observed since creation.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::Relaxed)
    }
}

/// RAII guard for an acquired execution slot.
///
/// Dropping the permit releases the slot and decrements the in-flight gauge.
#[derive(Debug)]
pub struct SlotPermit {
    _permit: OwnedSemaphorePermit,
    in_flight: Arc<AtomicUsize>,
}

impl Drop for SlotPermit {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn acquire_and_release_updates_gauges() {
        let slots = ExecutionSlots::new(2);
        assert_eq!(slots.in_flight(), 0);

        let a = slots.acquire().await;
        let b = slots.acquire().await;
        assert_eq!(slots.in_flight(), 2);
        assert_eq!(slots.peak_in_flight(), 2);

        drop(a);
        assert_eq!(slots.in_flight(), 1);
        drop(b);
        assert_eq!(slots.in_flight(), 0);

        // Peak is sticky.
        assert_eq!(slots.peak_in_flight(), 2);
    }

    #[tokio::test]
    async fn acquire_blocks_at_capacity() {
        let slots = Arc::new(ExecutionSlots::new(1));
        let _held = slots.acquire().await;

        let slots_clone = Arc::clone(&slots);
        let blocked = tokio::spawn(async move { slots_clone.acquire().await });

        // The second acquire cannot complete while the first permit is held.
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(!blocked.is_finished());

        drop(_held);
        let permit = blocked.await.unwrap();
        assert_eq!(slots.in_flight(), 1);
        drop(permit);
    }

    #[test]
    #[should_panic(expected = "capacity must be > 0")]
    fn zero_capacity_panics() {
        let _ = ExecutionSlots::new(0);
    }
}
