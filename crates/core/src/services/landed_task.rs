//! Landed translation task service.
//!
//! A task reminds reviewers that a translation has landed in the CMS. It is
//! completed when the content is published in that locale.

use chrono::Utc;
use locsync_common::{AppResult, IdGenerator};
use locsync_db::entities::landed_translation_task;
use locsync_db::repositories::LandedTaskRepository;
use sea_orm::Set;
use tracing::info;

/// Largest page returned by [`LandedTaskService::list_open`].
const MAX_PAGE_SIZE: u64 = 100;

/// Service for landed translation tasks.
#[derive(Clone)]
pub struct LandedTaskService {
    repo: LandedTaskRepository,
    id_gen: IdGenerator,
}

impl LandedTaskService {
    #[must_use]
    pub const fn new(repo: LandedTaskRepository) -> Self {
        Self {
            repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Open a task for one locale of a piece of content.
    pub async fn create(
        &self,
        content_type: &str,
        object_id: &str,
        relevant_locale: &str,
    ) -> AppResult<landed_translation_task::Model> {
        let model = landed_translation_task::ActiveModel {
            id: Set(self.id_gen.generate()),
            content_type: Set(content_type.to_string()),
            object_id: Set(object_id.to_string()),
            relevant_locale: Set(relevant_locale.to_string()),
            created_at: Set(Utc::now().into()),
            completed_at: Set(None),
            cancelled_at: Set(None),
        };

        let task = self.repo.create(model).await?;
        info!(
            task_id = %task.id,
            content_type = %content_type,
            object_id = %object_id,
            locale = %relevant_locale,
            "Created landed translation task"
        );
        Ok(task)
    }

    /// Content was published in a locale; close its open tasks.
    pub async fn complete_for_published(
        &self,
        content_type: &str,
        object_id: &str,
        relevant_locale: &str,
    ) -> AppResult<u64> {
        let completed = self
            .repo
            .complete_open_for(content_type, object_id, relevant_locale)
            .await?;
        if completed > 0 {
            info!(
                content_type = %content_type,
                object_id = %object_id,
                locale = %relevant_locale,
                completed,
                "Completed landed translation tasks"
            );
        }
        Ok(completed)
    }

    pub async fn cancel(&self, id: &str) -> AppResult<landed_translation_task::Model> {
        self.repo.cancel(id).await
    }

    /// Open tasks, newest first.
    pub async fn list_open(
        &self,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<landed_translation_task::Model>> {
        self.repo
            .find_open(limit.clamp(1, MAX_PAGE_SIZE), offset)
            .await
    }
}
