//! Landed translation task repository.

use std::sync::Arc;

use chrono::Utc;
use locsync_common::{AppError, AppResult};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::entities::{LandedTranslationTask, landed_translation_task};

/// Landed translation task repository for database operations.
#[derive(Clone)]
pub struct LandedTaskRepository {
    db: Arc<DatabaseConnection>,
}

impl LandedTaskRepository {
    /// Create a new landed task repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a task by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<landed_translation_task::Model>> {
        LandedTranslationTask::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a task by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<landed_translation_task::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Landed translation task {id} not found")))
    }

    /// Create a new task.
    pub async fn create(
        &self,
        model: landed_translation_task::ActiveModel,
    ) -> AppResult<landed_translation_task::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find open tasks, newest first.
    pub async fn find_open(
        &self,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<landed_translation_task::Model>> {
        LandedTranslationTask::find()
            .filter(landed_translation_task::Column::CompletedAt.is_null())
            .filter(landed_translation_task::Column::CancelledAt.is_null())
            .order_by_desc(landed_translation_task::Column::CreatedAt)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Complete every open task for a piece of content in one locale.
    pub async fn complete_open_for(
        &self,
        content_type: &str,
        object_id: &str,
        relevant_locale: &str,
    ) -> AppResult<u64> {
        let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();

        let result = LandedTranslationTask::update_many()
            .col_expr(
                landed_translation_task::Column::CompletedAt,
                Expr::value(now),
            )
            .filter(landed_translation_task::Column::ContentType.eq(content_type))
            .filter(landed_translation_task::Column::ObjectId.eq(object_id))
            .filter(landed_translation_task::Column::RelevantLocale.eq(relevant_locale))
            .filter(landed_translation_task::Column::CompletedAt.is_null())
            .filter(landed_translation_task::Column::CancelledAt.is_null())
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Cancel a task.
    pub async fn cancel(&self, id: &str) -> AppResult<landed_translation_task::Model> {
        let task = self.get_by_id(id).await?;
        if !task.is_open() {
            return Err(AppError::Conflict(format!(
                "Landed translation task {id} is already closed"
            )));
        }

        let mut active: landed_translation_task::ActiveModel = task.into();
        active.cancelled_at = Set(Some(Utc::now().into()));
        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_task(id: &str) -> landed_translation_task::Model {
        landed_translation_task::Model {
            id: id.to_string(),
            content_type: "page".to_string(),
            object_id: "42".to_string(),
            relevant_locale: "fr".to_string(),
            created_at: Utc::now().into(),
            completed_at: None,
            cancelled_at: None,
        }
    }

    #[tokio::test]
    async fn test_complete_open_for() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 2,
                }])
                .into_connection(),
        );

        let repo = LandedTaskRepository::new(db);
        let completed = repo.complete_open_for("page", "42", "fr").await.unwrap();

        assert_eq!(completed, 2);
    }

    #[tokio::test]
    async fn test_cancel_open_task() {
        let task = create_test_task("task1");
        let mut cancelled = task.clone();
        cancelled.cancelled_at = Some(Utc::now().into());

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[task]])
                .append_query_results([[cancelled]])
                .into_connection(),
        );

        let repo = LandedTaskRepository::new(db);
        let result = repo.cancel("task1").await.unwrap();

        assert!(!result.is_open());
    }

    #[tokio::test]
    async fn test_cancel_closed_task_conflicts() {
        let mut task = create_test_task("task1");
        task.completed_at = Some(Utc::now().into());

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[task]])
                .into_connection(),
        );

        let repo = LandedTaskRepository::new(db);
        let result = repo.cancel("task1").await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }
}
