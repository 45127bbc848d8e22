use crate::{Error, ErrorContext, Result};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Point-in-time view of limiter usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InflightSnapshot {
    pub max: usize,
    pub available: usize,
    pub in_use: usize,
}

/// Caps how many calls may be in flight at once.
///
/// Backed by a tokio semaphore. Permits are released when the returned guard
/// drops, whether the guarded call succeeded, failed or panicked.
#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    sem: Arc<Semaphore>,
    max: usize,
}

impl ConcurrencyLimiter {
    pub fn new(max: usize) -> Result<Self> {
        if max == 0 {
            return Err(Error::configuration_with_context(
                "concurrency limit must be at least 1",
                ErrorContext::new()
                    .with_field_path("params.max_concurrent")
                    .with_source("concurrency_limiter"),
            ));
        }
        Ok(Self {
            sem: Arc::new(Semaphore::new(max)),
            max,
        })
    }

    /// Wait for a free slot.
    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit> {
        self.sem
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| Error::runtime("Concurrency limiter closed"))
    }

    pub fn try_acquire(&self) -> Option<OwnedSemaphorePermit> {
        self.sem.clone().try_acquire_owned().ok()
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn available(&self) -> usize {
        self.sem.available_permits()
    }

    pub fn in_flight(&self) -> usize {
        self.max - self.available()
    }

    pub fn snapshot(&self) -> InflightSnapshot {
        let available = self.available();
        InflightSnapshot {
            max: self.max,
            available,
            in_use: self.max - available,
        }
    }
}
