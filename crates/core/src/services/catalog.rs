//! Host CMS seam.
//!
//! The CMS owns the translatable content. The core only needs to export a
//! source as PO entries, describe it for job naming, and hand translated
//! entries back.

use std::sync::Arc;

use async_trait::async_trait;
use locsync_common::AppResult;
use locsync_db::entities::{job, job_translation};

use crate::po::PoEntry;

/// What the CMS says about a translation source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDescription {
    pub content_type: String,
    pub object_id: String,
    /// Human label for the content type, e.g. `page`.
    pub kind: String,
    pub title: String,
}

/// A CMS translation requested as part of a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationTarget {
    pub translation_id: String,
    /// CMS locale code.
    pub locale: String,
}

/// Content operations implemented by the host CMS.
#[async_trait]
pub trait ContentCatalog: Send + Sync {
    /// Export the translatable strings of a source, in natural order.
    async fn export_po(&self, content_type: &str, object_id: &str) -> AppResult<Vec<PoEntry>>;

    async fn describe_source(
        &self,
        content_type: &str,
        object_id: &str,
    ) -> AppResult<SourceDescription>;

    /// Apply translated entries to one translation of a job.
    ///
    /// Runs outside the job's database transaction. A sync that fails
    /// after this call is retried and imports the same entries again, so
    /// implementations must be idempotent.
    async fn import_translation(
        &self,
        job: &job::Model,
        translation: &job_translation::Model,
        entries: Vec<PoEntry>,
    ) -> AppResult<()>;
}

/// Type alias for a shared catalog.
pub type Catalog = Arc<dyn ContentCatalog>;
