//! Optional strategies the host can plug in.

use std::sync::Arc;

use async_trait::async_trait;
use locsync_common::AppResult;
use locsync_db::entities::job;

use super::catalog::{SourceDescription, TranslationTarget};

/// Builds the description sent with a new vendor job.
pub trait JobDescriber: Send + Sync {
    /// Return the description to use; `default` is what would be used otherwise.
    fn describe(
        &self,
        default: &str,
        source: &SourceDescription,
        translations: &[TranslationTarget],
    ) -> String;
}

/// Outcome of asking for a job's visual context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisualContext {
    /// Rendered page to upload.
    Provided { url: String, html: Vec<u8> },
    /// The provider has nothing for this job, with a reason for the log.
    Declined(String),
}

/// Renders the source page of a job so translators can see it in place.
#[async_trait]
pub trait VisualContextProvider: Send + Sync {
    async fn visual_context(&self, job: &job::Model) -> AppResult<VisualContext>;
}

pub type JobDescriberService = Arc<dyn JobDescriber>;
pub type VisualContextService = Arc<dyn VisualContextProvider>;
