//! Vendor project repository.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use locsync_common::{AppError, AppResult, IdGenerator};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use tracing::debug;

use crate::entities::{Project, ProjectTargetLocale, project, project_target_locale};

/// Project attributes as reported by the vendor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSnapshot {
    pub environment: String,
    pub account_uid: String,
    pub project_uid: String,
    pub archived: bool,
    pub name: String,
    pub type_code: String,
    pub source_locale_id: String,
    pub source_locale_description: String,
    pub target_locales: Vec<TargetLocaleSnapshot>,
}

/// A target locale as reported by the vendor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetLocaleSnapshot {
    pub locale_id: String,
    pub description: String,
    pub enabled: bool,
}

/// Project repository for database operations.
#[derive(Clone)]
pub struct ProjectRepository {
    db: Arc<DatabaseConnection>,
    id_gen: IdGenerator,
}

impl ProjectRepository {
    /// Create a new project repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            id_gen: IdGenerator::new(),
        }
    }

    /// Find a project by its (environment, account, project) key.
    pub async fn find_by_key(
        &self,
        environment: &str,
        account_uid: &str,
        project_uid: &str,
    ) -> AppResult<Option<project::Model>> {
        Project::find()
            .filter(project::Column::Environment.eq(environment))
            .filter(project::Column::AccountUid.eq(account_uid))
            .filter(project::Column::ProjectUid.eq(project_uid))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List the target locales of a project.
    pub async fn find_target_locales(
        &self,
        project_id: &str,
    ) -> AppResult<Vec<project_target_locale::Model>> {
        ProjectTargetLocale::find()
            .filter(project_target_locale::Column::ProjectId.eq(project_id))
            .order_by_asc(project_target_locale::Column::LocaleId)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store a vendor snapshot.
    ///
    /// Project attributes are overwritten, and the stored target locales are
    /// replaced by the snapshot's set.
    pub async fn save_snapshot(
        &self,
        snapshot: ProjectSnapshot,
    ) -> AppResult<(project::Model, Vec<project_target_locale::Model>)> {
        let now = Utc::now();
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let existing = Project::find()
            .filter(project::Column::Environment.eq(&snapshot.environment))
            .filter(project::Column::AccountUid.eq(&snapshot.account_uid))
            .filter(project::Column::ProjectUid.eq(&snapshot.project_uid))
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let project = match existing {
            Some(existing) => {
                let mut active: project::ActiveModel = existing.into();
                active.archived = Set(snapshot.archived);
                active.name = Set(snapshot.name.clone());
                active.type_code = Set(snapshot.type_code.clone());
                active.source_locale_id = Set(snapshot.source_locale_id.clone());
                active.source_locale_description =
                    Set(snapshot.source_locale_description.clone());
                active.last_synced_at = Set(now.into());
                active.update(&txn).await
            }
            None => {
                project::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    environment: Set(snapshot.environment.clone()),
                    account_uid: Set(snapshot.account_uid.clone()),
                    project_uid: Set(snapshot.project_uid.clone()),
                    archived: Set(snapshot.archived),
                    name: Set(snapshot.name.clone()),
                    type_code: Set(snapshot.type_code.clone()),
                    source_locale_id: Set(snapshot.source_locale_id.clone()),
                    source_locale_description: Set(snapshot.source_locale_description.clone()),
                    first_synced_at: Set(now.into()),
                    last_synced_at: Set(now.into()),
                }
                .insert(&txn)
                .await
            }
        }
        .map_err(|e| AppError::Database(e.to_string()))?;

        let locale_ids: Vec<String> = snapshot
            .target_locales
            .iter()
            .map(|l| l.locale_id.clone())
            .collect();

        let removed = ProjectTargetLocale::delete_many()
            .filter(project_target_locale::Column::ProjectId.eq(&project.id))
            .filter(project_target_locale::Column::LocaleId.is_not_in(locale_ids))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut current: HashMap<String, project_target_locale::Model> =
            ProjectTargetLocale::find()
                .filter(project_target_locale::Column::ProjectId.eq(&project.id))
                .all(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?
                .into_iter()
                .map(|l| (l.locale_id.clone(), l))
                .collect();

        let mut target_locales = Vec::with_capacity(snapshot.target_locales.len());
        for locale in snapshot.target_locales {
            let saved = match current.remove(&locale.locale_id) {
                Some(row) => {
                    let mut active: project_target_locale::ActiveModel = row.into();
                    active.description = Set(locale.description);
                    active.enabled = Set(locale.enabled);
                    active.update(&txn).await
                }
                None => {
                    project_target_locale::ActiveModel {
                        id: Set(self.id_gen.generate()),
                        project_id: Set(project.id.clone()),
                        locale_id: Set(locale.locale_id),
                        description: Set(locale.description),
                        enabled: Set(locale.enabled),
                    }
                    .insert(&txn)
                    .await
                }
            }
            .map_err(|e| AppError::Database(e.to_string()))?;
            target_locales.push(saved);
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        debug!(
            project_id = %project.id,
            locales = target_locales.len(),
            removed = removed.rows_affected,
            "Saved project snapshot"
        );

        Ok((project, target_locales))
    }
}
