//! Where a scheduled sync runs.
//!
//! [`InlineDispatcher`] syncs in the calling task. [`RedisDispatcher`]
//! queues a [`SyncJobTask`] for the apalis sync worker instead.

use apalis::prelude::*;
use apalis_redis::RedisStorage;
use async_trait::async_trait;
use locsync_core::{SyncError, SyncService};
use thiserror::Error;
use tracing::{debug, info};

use crate::jobs::SyncJobTask;

/// Dispatch failures.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The in-process sync failed.
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// The task could not be queued.
    #[error("Failed to queue sync task: {0}")]
    Queue(String),
}

/// Hands one job to whatever performs the sync.
#[async_trait]
pub trait SyncDispatcher: Send + Sync {
    /// Sync `job_id` now, or arrange for it to be synced.
    async fn dispatch(&self, job_id: &str) -> Result<(), DispatchError>;
}

/// Runs the sync engine in process.
#[derive(Clone)]
pub struct InlineDispatcher {
    sync: SyncService,
}

impl InlineDispatcher {
    /// Create a dispatcher around the sync engine.
    #[must_use]
    pub const fn new(sync: SyncService) -> Self {
        Self { sync }
    }
}

#[async_trait]
impl SyncDispatcher for InlineDispatcher {
    async fn dispatch(&self, job_id: &str) -> Result<(), DispatchError> {
        let report = self.sync.sync_job(job_id).await?;
        if report.status_changed() {
            info!(
                job_id = %job_id,
                from = ?report.previous_status,
                to = ?report.job.status,
                imported = report.imported.len(),
                "Job status changed"
            );
        } else {
            debug!(job_id = %job_id, status = ?report.job.status, "Job unchanged");
        }
        Ok(())
    }
}

/// Queues sync tasks to Redis for the sync worker.
#[derive(Clone)]
pub struct RedisDispatcher {
    storage: RedisStorage<SyncJobTask>,
}

impl RedisDispatcher {
    /// Create a dispatcher pushing to `storage`.
    #[must_use]
    pub const fn new(storage: RedisStorage<SyncJobTask>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl SyncDispatcher for RedisDispatcher {
    async fn dispatch(&self, job_id: &str) -> Result<(), DispatchError> {
        self.storage
            .clone()
            .push(SyncJobTask::new(job_id.to_string()))
            .await
            .map_err(|e| DispatchError::Queue(e.to_string()))?;

        debug!(job_id = %job_id, "Queued sync task");
        Ok(())
    }
}
