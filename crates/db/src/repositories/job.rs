//! Translation job repository.

use std::sync::Arc;

use chrono::Utc;
use locsync_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::entities::job::JobStatus;
use crate::entities::{Job, JobTranslation, job, job_translation};

/// Job repository for database operations.
#[derive(Clone)]
pub struct JobRepository {
    db: Arc<DatabaseConnection>,
}

impl JobRepository {
    /// Create a new job repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Start a transaction on the pool connection.
    ///
    /// Always an outermost transaction: there is no way to reach this from
    /// inside another transaction.
    pub async fn begin(&self) -> AppResult<DatabaseTransaction> {
        self.db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a job by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<job::Model>> {
        Job::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a job by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<job::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))
    }

    /// Load a job with `SELECT ... FOR UPDATE`.
    ///
    /// The row stays locked until `txn` commits or rolls back.
    pub async fn lock_by_id(
        &self,
        txn: &DatabaseTransaction,
        id: &str,
    ) -> AppResult<Option<job::Model>> {
        Job::find_by_id(id)
            .lock_exclusive()
            .one(txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a job inside a transaction.
    pub async fn update_in(
        &self,
        txn: &DatabaseTransaction,
        model: job::ActiveModel,
    ) -> AppResult<job::Model> {
        model
            .update(txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the translations requested by a job.
    pub async fn find_translations(&self, job_id: &str) -> AppResult<Vec<job_translation::Model>> {
        JobTranslation::find()
            .filter(job_translation::Column::JobId.eq(job_id))
            .order_by_asc(job_translation::Column::Locale)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the translations requested by a job inside a transaction.
    pub async fn translations_in(
        &self,
        txn: &DatabaseTransaction,
        job_id: &str,
    ) -> AppResult<Vec<job_translation::Model>> {
        JobTranslation::find()
            .filter(job_translation::Column::JobId.eq(job_id))
            .order_by_asc(job_translation::Column::Locale)
            .all(txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Stamp a translation as imported inside a transaction.
    pub async fn mark_translation_imported_in(
        &self,
        txn: &DatabaseTransaction,
        translation: job_translation::Model,
        at: chrono::DateTime<Utc>,
    ) -> AppResult<job_translation::Model> {
        let mut active: job_translation::ActiveModel = translation.into();
        active.imported_at = Set(Some(at.into()));
        active
            .update(txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an unsynced or pending job for the same source and content hash.
    pub async fn find_duplicate(
        &self,
        source_content_type: &str,
        source_object_id: &str,
        content_hash: &str,
    ) -> AppResult<Option<job::Model>> {
        let mut statuses = JobStatus::PENDING.to_vec();
        statuses.push(JobStatus::Unsynced);

        Job::find()
            .filter(job::Column::SourceContentType.eq(source_content_type))
            .filter(job::Column::SourceObjectId.eq(source_object_id))
            .filter(job::Column::ContentHash.eq(content_hash))
            .filter(job::Column::Status.is_in(statuses))
            .order_by_desc(job::Column::CreatedAt)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// IDs of every job that still needs syncing, oldest first.
    pub async fn find_syncable_ids(&self) -> AppResult<Vec<String>> {
        Job::find()
            .select_only()
            .column(job::Column::Id)
            .filter(job::Column::Status.is_not_in(JobStatus::FINAL))
            .order_by_asc(job::Column::CreatedAt)
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find jobs that have no content hash recorded.
    pub async fn find_missing_hash(&self, limit: u64) -> AppResult<Vec<job::Model>> {
        Job::find()
            .filter(job::Column::ContentHash.eq(""))
            .order_by_asc(job::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Record the content hash of a job.
    pub async fn set_content_hash(&self, id: &str, content_hash: &str) -> AppResult<job::Model> {
        let job = self.get_by_id(id).await?;
        let mut active: job::ActiveModel = job.into();
        active.content_hash = Set(content_hash.to_string());
        active.updated_at = Set(Utc::now().into());
        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a job together with its translations.
    pub async fn create_with_translations(
        &self,
        model: job::ActiveModel,
        translations: Vec<job_translation::ActiveModel>,
    ) -> AppResult<(job::Model, Vec<job_translation::Model>)> {
        let txn = self.begin().await?;

        let job = model
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut saved = Vec::with_capacity(translations.len());
        for translation in translations {
            saved.push(
                translation
                    .insert(&txn)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?,
            );
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok((job, saved))
    }
}
