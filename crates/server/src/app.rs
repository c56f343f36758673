//! Service wiring shared by the CLI commands.

use std::sync::Arc;

use async_trait::async_trait;
use locsync_common::{AppResult, Config};
use locsync_core::{
    Catalog, FanOutEventHandler, LandedTaskRecorder, LandedTaskService, LocaleFormatter,
    ProjectCache, SubmissionService, SyncEventHandler, SyncEventHandlerService, SyncService,
    Vendor,
};
use locsync_db::entities::{job, job_translation};
use locsync_db::repositories::{JobRepository, LandedTaskRepository, ProjectRepository};
use locsync_smartling::SmartlingClient;
use sea_orm::DatabaseConnection;
use tracing::info;

use crate::catalog::FileCatalog;

/// Logs each successful import batch for the job's owner.
struct ImportNotifier;

#[async_trait]
impl SyncEventHandler for ImportNotifier {
    async fn translation_imported(
        &self,
        _job: &job::Model,
        _translation: &job_translation::Model,
    ) -> AppResult<()> {
        Ok(())
    }

    async fn import_successful(
        &self,
        job: &job::Model,
        translations: &[job_translation::Model],
    ) -> AppResult<()> {
        let locales: Vec<&str> = translations.iter().map(|t| t.locale.as_str()).collect();
        info!(
            job_id = %job.id,
            name = %job.name,
            user_id = job.user_id.as_deref().unwrap_or("-"),
            locales = ?locales,
            "Translations imported"
        );
        Ok(())
    }
}

/// Connected services.
pub struct App {
    pub config: Config,
    pub db: Arc<DatabaseConnection>,
    pub project_cache: Arc<ProjectCache>,
    pub submission: SubmissionService,
    pub sync: SyncService,
}

impl App {
    /// Connect to the database and build every service from `config`.
    pub async fn connect(config: Config) -> anyhow::Result<Self> {
        let db = Arc::new(locsync_db::init(&config).await?);
        info!("Connected to database");

        let vendor: Vendor = Arc::new(SmartlingClient::new(&config.smartling)?);
        let catalog: Catalog = Arc::new(FileCatalog::new(&config.catalog.root));
        let job_repo = JobRepository::new(db.clone());

        let project_cache = Arc::new(ProjectCache::new(
            ProjectRepository::new(db.clone()),
            vendor.clone(),
            config.smartling.environment.as_str(),
        ));

        let recorder = LandedTaskRecorder::new(
            LandedTaskService::new(LandedTaskRepository::new(db.clone())),
            config.smartling.add_approval_tasks,
        );
        let events: SyncEventHandlerService = Arc::new(
            FanOutEventHandler::default()
                .with(Arc::new(recorder))
                .with(Arc::new(ImportNotifier)),
        );

        let submission = SubmissionService::new(
            job_repo.clone(),
            project_cache.clone(),
            vendor.clone(),
            catalog.clone(),
        )
        .with_name_prefix(config.smartling.job_name_prefix.clone());

        let sync = SyncService::new(
            job_repo,
            vendor,
            catalog,
            LocaleFormatter::from_config(&config.smartling),
            events,
        );

        Ok(Self {
            config,
            db,
            project_cache,
            submission,
            sync,
        })
    }

    pub fn job_repo(&self) -> JobRepository {
        JobRepository::new(self.db.clone())
    }
}
