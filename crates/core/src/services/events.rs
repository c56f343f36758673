//! Sync event hooks.
//!
//! Events fire after the sync transaction commits. Handler failures are
//! logged by the engine and never undo a sync.

use std::sync::Arc;

use async_trait::async_trait;
use locsync_common::AppResult;
use locsync_db::entities::{job, job_translation};
use tracing::{debug, warn};

use super::landed_task::LandedTaskService;

/// Receives translation import events from the sync engine.
#[async_trait]
pub trait SyncEventHandler: Send + Sync {
    /// One translation of a job was imported.
    async fn translation_imported(
        &self,
        job: &job::Model,
        translation: &job_translation::Model,
    ) -> AppResult<()>;

    /// A sync imported at least one translation; `translations` lists all of them.
    async fn import_successful(
        &self,
        job: &job::Model,
        translations: &[job_translation::Model],
    ) -> AppResult<()>;
}

/// No-op handler.
pub struct NoOpEventHandler;

#[async_trait]
impl SyncEventHandler for NoOpEventHandler {
    async fn translation_imported(
        &self,
        _job: &job::Model,
        _translation: &job_translation::Model,
    ) -> AppResult<()> {
        Ok(())
    }

    async fn import_successful(
        &self,
        _job: &job::Model,
        _translations: &[job_translation::Model],
    ) -> AppResult<()> {
        Ok(())
    }
}

/// Forwards every event to each inner handler in order.
///
/// A failing handler is logged and does not stop the others.
#[derive(Default)]
pub struct FanOutEventHandler {
    handlers: Vec<SyncEventHandlerService>,
}

impl FanOutEventHandler {
    #[must_use]
    pub const fn new(handlers: Vec<SyncEventHandlerService>) -> Self {
        Self { handlers }
    }

    #[must_use]
    pub fn with(mut self, handler: SyncEventHandlerService) -> Self {
        self.handlers.push(handler);
        self
    }
}

#[async_trait]
impl SyncEventHandler for FanOutEventHandler {
    async fn translation_imported(
        &self,
        job: &job::Model,
        translation: &job_translation::Model,
    ) -> AppResult<()> {
        for handler in &self.handlers {
            if let Err(e) = handler.translation_imported(job, translation).await {
                warn!(job_id = %job.id, translation_id = %translation.translation_id, error = %e, "Translation imported handler failed");
            }
        }
        Ok(())
    }

    async fn import_successful(
        &self,
        job: &job::Model,
        translations: &[job_translation::Model],
    ) -> AppResult<()> {
        for handler in &self.handlers {
            if let Err(e) = handler.import_successful(job, translations).await {
                warn!(job_id = %job.id, error = %e, "Import successful handler failed");
            }
        }
        Ok(())
    }
}

/// Opens a landed translation task for every imported translation.
pub struct LandedTaskRecorder {
    tasks: LandedTaskService,
    enabled: bool,
}

impl LandedTaskRecorder {
    /// `enabled` mirrors the `add_approval_tasks` setting.
    #[must_use]
    pub const fn new(tasks: LandedTaskService, enabled: bool) -> Self {
        Self { tasks, enabled }
    }
}

#[async_trait]
impl SyncEventHandler for LandedTaskRecorder {
    async fn translation_imported(
        &self,
        job: &job::Model,
        translation: &job_translation::Model,
    ) -> AppResult<()> {
        if !self.enabled {
            debug!(job_id = %job.id, "Approval tasks disabled, not recording");
            return Ok(());
        }

        self.tasks
            .create(
                &job.source_content_type,
                &job.source_object_id,
                &translation.locale,
            )
            .await?;
        Ok(())
    }

    async fn import_successful(
        &self,
        _job: &job::Model,
        _translations: &[job_translation::Model],
    ) -> AppResult<()> {
        Ok(())
    }
}

/// Type alias for a shared event handler.
pub type SyncEventHandlerService = Arc<dyn SyncEventHandler>;
