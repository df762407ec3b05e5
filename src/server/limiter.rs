//! Cap on concurrently running extractor processes.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// No slot came free before the caller's deadline.
#[derive(Debug, thiserror::Error)]
#[error("no extractor slot free within {0:?}")]
pub struct SlotTimeout(pub Duration);

/// Hands out one permit per extractor process.
///
/// Callers wait for a free slot rather than being turned away, but never
/// longer than the deadline they pass in. A limit of 0 disables the cap.
#[derive(Debug, Clone)]
pub struct ProcessLimiter {
    semaphore: Option<Arc<Semaphore>>,
}

impl ProcessLimiter {
    pub fn new(max_processes: usize) -> Self {
        let semaphore = (max_processes > 0).then(|| Arc::new(Semaphore::new(max_processes)));
        Self { semaphore }
    }

    /// Wait for a slot. Returns `None` when no cap is configured.
    pub async fn acquire(&self) -> Option<OwnedSemaphorePermit> {
        let semaphore = self.semaphore.as_ref()?;
        if semaphore.available_permits() == 0 {
            tracing::debug!("All extractor slots busy, waiting");
        }
        semaphore.clone().acquire_owned().await.ok()
    }

    /// Wait for a slot for at most `limit`.
    pub async fn acquire_within(
        &self,
        limit: Duration,
    ) -> Result<Option<OwnedSemaphorePermit>, SlotTimeout> {
        tokio::time::timeout(limit, self.acquire())
            .await
            .map_err(|_| SlotTimeout(limit))
    }

    /// Free slots, or `None` when unlimited.
    pub fn available(&self) -> Option<usize> {
        self.semaphore.as_ref().map(|s| s.available_permits())
    }
}
