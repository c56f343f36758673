//! Process-wide cache of the vendor project.

use std::sync::Arc;

use locsync_common::{AppError, AppResult};
use locsync_db::entities::{project, project_target_locale};
use locsync_db::repositories::{ProjectRepository, ProjectSnapshot, TargetLocaleSnapshot};
use tokio::sync::RwLock;
use tracing::info;

use super::vendor::Vendor;

/// The project as last fetched from the vendor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentProject {
    pub project: project::Model,
    pub target_locales: Vec<project_target_locale::Model>,
}

/// Fetches the vendor project once and keeps it for the process lifetime.
///
/// There is no expiry. Call [`ProjectCache::refresh`] or
/// [`ProjectCache::clear`] to pick up vendor-side changes.
pub struct ProjectCache {
    repo: ProjectRepository,
    vendor: Vendor,
    environment: String,
    current: RwLock<Option<Arc<CurrentProject>>>,
}

impl ProjectCache {
    #[must_use]
    pub fn new(repo: ProjectRepository, vendor: Vendor, environment: impl Into<String>) -> Self {
        Self {
            repo,
            vendor,
            environment: environment.into(),
            current: RwLock::new(None),
        }
    }

    /// The cached project, fetching it on first use.
    pub async fn get(&self) -> AppResult<Arc<CurrentProject>> {
        if let Some(current) = self.current.read().await.as_ref() {
            return Ok(current.clone());
        }
        self.refresh().await
    }

    /// Fetch the project from the vendor and store it, replacing the cache.
    pub async fn refresh(&self) -> AppResult<Arc<CurrentProject>> {
        let details = self
            .vendor
            .get_project_details()
            .await
            .map_err(|e| AppError::ExternalService(e.to_string()))?;

        let snapshot = ProjectSnapshot {
            environment: self.environment.clone(),
            account_uid: details.account_uid,
            project_uid: details.project_id,
            archived: details.archived,
            name: details.project_name,
            type_code: details.project_type_code,
            source_locale_id: details.source_locale_id,
            source_locale_description: details.source_locale_description,
            target_locales: details
                .target_locales
                .into_iter()
                .map(|l| TargetLocaleSnapshot {
                    locale_id: l.locale_id,
                    description: l.description,
                    enabled: l.enabled,
                })
                .collect(),
        };

        let (project, target_locales) = self.repo.save_snapshot(snapshot).await?;
        info!(
            project_id = %project.id,
            project_uid = %project.project_uid,
            target_locales = target_locales.len(),
            "Refreshed vendor project"
        );

        let current = Arc::new(CurrentProject {
            project,
            target_locales,
        });
        *self.current.write().await = Some(current.clone());
        Ok(current)
    }

    /// Forget the cached project.
    pub async fn clear(&self) {
        *self.current.write().await = None;
    }

    #[cfg(test)]
    pub(crate) async fn prime(&self, current: CurrentProject) {
        *self.current.write().await = Some(Arc::new(current));
    }
}
