// src/services/gate.rs

//! Request admission gate.
//!
//! Every network-bound operation holds one permit for its whole duration.
//! Permits are returned on drop, so errors and cancellation release them too.

use std::future::Future;

use tokio::sync::{Semaphore, SemaphorePermit};

use crate::error::{AppError, Result};

/// Fixed-capacity concurrency limiter shared by one crawl run.
#[derive(Debug)]
pub struct RateGate {
    semaphore: Semaphore,
    capacity: usize,
}

impl RateGate {
    /// Create a gate admitting at most `capacity` concurrent operations.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Semaphore::new(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Permits currently free.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Wait for a free slot. The slot is released when the permit drops.
    pub async fn acquire(&self) -> Result<SemaphorePermit<'_>> {
        self.semaphore
            .acquire()
            .await
            .map_err(|e| AppError::crawl("rate gate", e))
    }

    /// Run one network operation while holding a permit.
    pub async fn run<F, T>(&self, operation: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let _permit = self.acquire().await?;
        operation.await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use futures::future::join_all;

    use super::*;

    #[test]
    fn test_zero_capacity_is_clamped() {
        assert_eq!(RateGate::new(0).capacity(), 1);
    }

    #[tokio::test]
    async fn test_permit_released_on_drop() {
        let gate = RateGate::new(2);
        let permit = gate.acquire().await.unwrap();
        assert_eq!(gate.available(), 1);
        drop(permit);
        assert_eq!(gate.available(), 2);
    }

    #[tokio::test]
    async fn test_permit_released_on_error() {
        let gate = RateGate::new(1);
        let result: Result<()> = gate
            .run(async { Err(AppError::crawl("search", "boom")) })
            .await;
        assert!(result.is_err());
        assert_eq!(gate.available(), 1);
    }

    #[tokio::test]
    async fn test_in_flight_never_exceeds_capacity() {
        let gate = RateGate::new(3);
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let tasks = (0..12).map(|_| {
            let in_flight = Arc::clone(&in_flight);
            let peak = Arc::clone(&peak);
            gate.run(async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok(())
            })
        });

        let results = join_all(tasks).await;
        assert!(results.iter().all(|r| r.is_ok()));
        assert_eq!(peak.load(Ordering::SeqCst), 3);
        assert_eq!(gate.available(), 3);
    }
}
