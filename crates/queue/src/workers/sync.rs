//! Sync worker.

use apalis::prelude::*;
use locsync_core::{SyncError, SyncService};
use tracing::{error, info, warn};

use crate::jobs::SyncJobTask;

/// Context for the sync worker.
#[derive(Clone)]
pub struct SyncWorkerContext {
    /// The sync engine.
    pub sync: SyncService,
}

impl SyncWorkerContext {
    /// Create a new sync worker context.
    #[must_use]
    pub const fn new(sync: SyncService) -> Self {
        Self { sync }
    }
}

/// Worker function for syncing queued jobs.
///
/// A job deleted after it was queued is dropped. Sync failures fail the
/// task; the scheduler queues the job again on its next tick.
pub async fn sync_worker(task: SyncJobTask, ctx: Data<SyncWorkerContext>) -> Result<(), Error> {
    match ctx.sync.sync_job(&task.job_id).await {
        Ok(report) => {
            info!(
                job_id = %task.job_id,
                status = ?report.job.status,
                imported = report.imported.len(),
                "Job synced"
            );
            Ok(())
        }
        Err(SyncError::JobNotFound(id)) => {
            warn!(job_id = %id, "Queued job no longer exists");
            Ok(())
        }
        Err(e) => {
            error!(job_id = %task.job_id, error = %e, "Queued sync failed");
            let boxed: Box<dyn std::error::Error + Send + Sync> = Box::new(e);
            Err(Error::Failed(boxed.into()))
        }
    }
}
