use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;

use crate::enrichment::EnrichmentError;

/// Bounds provider traffic: at most `max_concurrent` calls in flight, and
/// consecutive call starts at least `min_interval` apart.
pub struct CallLimiter {
    permits: Arc<Semaphore>,
    min_interval: Duration,
    next_start: Mutex<Instant>,
}

impl CallLimiter {
    pub fn new(max_concurrent: usize, min_interval: Duration) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            min_interval,
            next_start: Mutex::new(Instant::now()),
        }
    }

    /// Waits for a free slot and for the spacing window. Hold the returned
    /// permit for the duration of the provider call.
    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit, EnrichmentError> {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| EnrichmentError::Closed)?;

        let start_at = {
            let mut next = self.next_start.lock().await;
            let start_at = (*next).max(Instant::now());
            *next = start_at + self.min_interval;
            start_at
        };
        tokio::time::sleep_until(start_at).await;

        Ok(permit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_calls_are_spaced() {
        let limiter = CallLimiter::new(4, Duration::from_millis(250));
        let started = Instant::now();

        let _a = limiter.acquire().await.unwrap();
        let _b = limiter.acquire().await.unwrap();
        let _c = limiter.acquire().await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrency_is_bounded() {
        let limiter = CallLimiter::new(1, Duration::ZERO);
        let held = limiter.acquire().await.unwrap();

        let pending = tokio::time::timeout(Duration::from_secs(1), limiter.acquire()).await;
        assert!(pending.is_err());

        drop(held);
        assert!(limiter.acquire().await.is_ok());
    }
}
