use media_models::MediaError;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::debug;

/// Bounds how many extractor processes run at once.
#[derive(Clone)]
pub struct ExtractionLimiter {
    sem: Arc<Semaphore>,
    limit: usize,
}

impl ExtractionLimiter {
    pub fn new(limit: usize) -> Self {
        Self {
            sem: Arc::new(Semaphore::new(limit)),
            limit,
        }
    }

    /// Waits for a slot. The slot is released when the guard is dropped.
    pub async fn acquire(&self) -> Result<PermitGuard, MediaError> {
        let permit = self
            .sem
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| MediaError::InternalError {
                reason: format!("Failed to acquire extraction slot: {}", e),
            })?;
        debug!(
            "Acquired extraction slot, {} of {} remaining",
            self.sem.available_permits(),
            self.limit
        );
        Ok(PermitGuard { _permit: permit })
    }

    pub fn available_permits(&self) -> usize {
        self.sem.available_permits()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

/// Holds an extraction slot until dropped.
pub struct PermitGuard {
    _permit: tokio::sync::OwnedSemaphorePermit,
}
