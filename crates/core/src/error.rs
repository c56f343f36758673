//! Sync engine errors.

use locsync_common::AppError;
use locsync_smartling::ClientError;

/// Error returned by the sync engine.
///
/// Everything that goes wrong inside a sync path reaches the caller as
/// [`SyncError::Failed`], so schedulers only need to handle one shape.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// No job row with this ID.
    #[error("Job {0} not found")]
    JobNotFound(String),

    /// A downloaded archive entry belongs to a different file.
    #[error("File URI mismatch: expected {expected:?}, found {found:?}")]
    FileUriMismatch { expected: String, found: String },

    /// An archive entry path is not `{locale}/{fileUri}`.
    #[error("Malformed archive entry: {0}")]
    MalformedArchiveEntry(String),

    /// The vendor reported a job status this system does not know.
    #[error("Unknown vendor job status: {0}")]
    UnknownStatus(String),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    App(#[from] AppError),

    /// Wrapper for every failure inside a sync path.
    #[error("Sync failed for job {job_id}: {source}")]
    Failed {
        job_id: String,
        source: Box<SyncError>,
    },
}

impl SyncError {
    pub(crate) fn failed(job_id: &str, source: Self) -> Self {
        Self::Failed {
            job_id: job_id.to_string(),
            source: Box::new(source),
        }
    }

    /// The job this failure belongs to, if known.
    #[must_use]
    pub fn job_id(&self) -> Option<&str> {
        match self {
            Self::Failed { job_id, .. } | Self::JobNotFound(job_id) => Some(job_id),
            _ => None,
        }
    }

    /// The underlying cause, looking through [`SyncError::Failed`].
    #[must_use]
    pub fn cause(&self) -> &Self {
        match self {
            Self::Failed { source, .. } => source.cause(),
            other => other,
        }
    }
}
