//! Concurrency gate for similarity computations
//!
//! A fixed number of permits; a request without a permit waits for one.
//! By default the wait is unbounded. With an acquire timeout configured, a
//! request that waits longer than that gives up with `GateError::Timeout`.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GateError {
    #[error("No similarity slot available within {0:?}")]
    Timeout(Duration),

    #[error("Concurrency gate closed")]
    Closed,
}

#[derive(Debug, Clone)]
pub struct ConcurrencyGate {
    semaphore: Arc<Semaphore>,
    acquire_timeout: Option<Duration>,
}

/// Held for the duration of one computation; the slot frees on drop
#[derive(Debug)]
pub struct GatePermit {
    _permit: OwnedSemaphorePermit,
}

impl ConcurrencyGate {
    pub fn new(permits: usize, acquire_timeout: Option<Duration>) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(permits)),
            acquire_timeout,
        }
    }

    pub async fn acquire(&self) -> Result<GatePermit, GateError> {
        let acquire = Arc::clone(&self.semaphore).acquire_owned();
        let permit = match self.acquire_timeout {
            Some(limit) => tokio::time::timeout(limit, acquire)
                .await
                .map_err(|_| GateError::Timeout(limit))?,
            None => acquire.await,
        }
        .map_err(|_| GateError::Closed)?;

        Ok(GatePermit { _permit: permit })
    }

    /// Slots free right now
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_permit_released_on_drop() {
        let gate = ConcurrencyGate::new(2, None);
        let first = gate.acquire().await.unwrap();
        assert_eq!(gate.available(), 1);
        drop(first);
        assert_eq!(gate.available(), 2);
    }

    #[tokio::test]
    async fn test_timeout_when_exhausted() {
        let gate = ConcurrencyGate::new(1, Some(Duration::from_millis(20)));
        let _held = gate.acquire().await.unwrap();
        let err = gate.acquire().await.unwrap_err();
        assert_eq!(err, GateError::Timeout(Duration::from_millis(20)));
    }

    #[tokio::test]
    async fn test_waiter_proceeds_after_release() {
        let gate = ConcurrencyGate::new(1, None);
        let held = gate.acquire().await.unwrap();

        let waiter = {
            let gate = gate.clone();
            tokio::spawn(async move { gate.acquire().await.map(|_| ()) })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!waiter.is_finished());

        drop(held);
        assert_eq!(waiter.await.unwrap(), Ok(()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_never_exceeds_permits() {
        let gate = ConcurrencyGate::new(3, None);
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..20)
            .map(|_| {
                let gate = gate.clone();
                let active = Arc::clone(&active);
                let peak = Arc::clone(&peak);
                tokio::spawn(async move {
                    let _permit = gate.acquire().await.unwrap();
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    active.fetch_sub(1, Ordering::SeqCst);
                })
            })
            .collect();

        for task in tasks {
            task.await.unwrap();
        }
        assert!(peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(gate.available(), 3);
    }
}
