//! Job sync task.

use serde::{Deserialize, Serialize};

/// Task asking a worker to sync one job with the vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncJobTask {
    /// The job row ID.
    pub job_id: String,
}

impl SyncJobTask {
    /// Create a new sync task.
    #[must_use]
    pub const fn new(job_id: String) -> Self {
        Self { job_id }
    }
}
