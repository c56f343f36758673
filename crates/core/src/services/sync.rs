//! Job synchronization engine.
//!
//! [`SyncService::sync_job`] drives one job against the vendor. The job row
//! is locked with `SELECT ... FOR UPDATE` for the whole call, inside a
//! transaction started from the pool connection, so two syncs of the same
//! job never overlap. Any failure rolls the transaction back.
//!
//! An unsynced job takes the initial path: create the vendor job, upload
//! the source file through a batch, then push visual context if available.
//! A failed visual context upload fails the whole sync.
//! Every other job takes the status path: refresh the vendor's view of the
//! job and, when a pending job has just been translated, import the
//! translated files.

use chrono::Utc;
use locsync_common::AppError;
use locsync_db::entities::job::JobStatus;
use locsync_db::entities::{job, job_translation};
use locsync_db::repositories::JobRepository;
use locsync_smartling::{ClientError, CreateJobParams, job_dashboard_url};
use sea_orm::{DatabaseTransaction, Set};
use tracing::{debug, error, info, warn};

use super::callbacks::{VisualContext, VisualContextService};
use super::catalog::Catalog;
use super::events::SyncEventHandlerService;
use super::vendor::Vendor;
use crate::error::SyncError;
use crate::locale::LocaleFormatter;
use crate::po;

/// What a sync did to a job.
#[derive(Debug, Clone)]
pub struct SyncReport {
    /// The job as committed.
    pub job: job::Model,
    pub previous_status: JobStatus,
    /// Translations imported by this sync.
    pub imported: Vec<job_translation::Model>,
}

impl SyncReport {
    #[must_use]
    pub fn status_changed(&self) -> bool {
        self.job.status != self.previous_status
    }
}

/// Stable vendor file URI for a job's source file.
///
/// Built from the job ID and source object ID only, so a retried upload
/// addresses the same vendor file.
#[must_use]
pub fn upload_file_uri(job: &job::Model) -> String {
    let object_id: String = job
        .source_object_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("job_{}_{object_id}.po", job.id)
}

/// Vendor dashboard link, empty when the vendor has no such job.
#[must_use]
pub fn dashboard_url(job: &job::Model, project_uid: &str) -> String {
    match job.status {
        JobStatus::Unsynced | JobStatus::Deleted => String::new(),
        _ => job_dashboard_url(project_uid, &job.translation_job_uid),
    }
}

/// Sync engine.
#[derive(Clone)]
pub struct SyncService {
    job_repo: JobRepository,
    vendor: Vendor,
    catalog: Catalog,
    formatter: LocaleFormatter,
    events: SyncEventHandlerService,
    visual_context: Option<VisualContextService>,
}

/// A parsed archive entry.
struct TranslatedFile {
    vendor_locale: String,
    content: Vec<u8>,
}

impl SyncService {
    #[must_use]
    pub const fn new(
        job_repo: JobRepository,
        vendor: Vendor,
        catalog: Catalog,
        formatter: LocaleFormatter,
        events: SyncEventHandlerService,
    ) -> Self {
        Self {
            job_repo,
            vendor,
            catalog,
            formatter,
            events,
            visual_context: None,
        }
    }

    #[must_use]
    pub fn with_visual_context(mut self, provider: VisualContextService) -> Self {
        self.visual_context = Some(provider);
        self
    }

    /// IDs of jobs that still need syncing.
    pub async fn syncable_job_ids(&self) -> Result<Vec<String>, AppError> {
        self.job_repo.find_syncable_ids().await
    }

    /// Sync one job with the vendor.
    ///
    /// Returns [`SyncError::JobNotFound`] when there is no such job and
    /// [`SyncError::Failed`] for anything that goes wrong once it is locked.
    pub async fn sync_job(&self, job_id: &str) -> Result<SyncReport, SyncError> {
        let txn = self
            .job_repo
            .begin()
            .await
            .map_err(|e| SyncError::failed(job_id, e.into()))?;

        let job = match self.job_repo.lock_by_id(&txn, job_id).await {
            Ok(Some(job)) => job,
            Ok(None) => {
                rollback(txn, job_id).await;
                return Err(SyncError::JobNotFound(job_id.to_string()));
            }
            Err(e) => {
                rollback(txn, job_id).await;
                return Err(SyncError::failed(job_id, e.into()));
            }
        };

        let result = if job.status == JobStatus::Unsynced {
            self.initial_sync(&txn, job).await
        } else {
            self.status_sync(&txn, job).await
        };

        match result {
            Ok(report) => {
                txn.commit().await.map_err(|e| {
                    SyncError::failed(job_id, AppError::Database(e.to_string()).into())
                })?;
                self.dispatch_events(&report).await;
                Ok(report)
            }
            Err(err) => {
                rollback(txn, job_id).await;
                error!(job_id = %job_id, error = %err, "Job sync failed");
                Err(SyncError::failed(job_id, err))
            }
        }
    }

    async fn initial_sync(
        &self,
        txn: &DatabaseTransaction,
        job: job::Model,
    ) -> Result<SyncReport, SyncError> {
        info!(job_id = %job.id, name = %job.name, "Performing initial sync");
        let previous_status = job.status;

        let translations = self.job_repo.translations_in(txn, &job.id).await?;
        let locale_ids = translations
            .iter()
            .map(|t| self.formatter.to_vendor(&t.locale))
            .collect::<Result<Vec<_>, _>>()?;

        let params = CreateJobParams {
            job_name: job.name.clone(),
            target_locale_ids: locale_ids.clone(),
            description: Some(job.description.clone()).filter(|d| !d.is_empty()),
            reference_number: Some(job.reference_number.clone()).filter(|r| !r.is_empty()),
            due_date: job.due_date.map(|d| d.with_timezone(&Utc)),
            ..CreateJobParams::default()
        };
        let created = self.vendor.create_job(&params).await?;
        let status = JobStatus::from_vendor(&created.job_status)
            .ok_or_else(|| SyncError::UnknownStatus(created.job_status.clone()))?;

        let now = Utc::now();
        let mut active: job::ActiveModel = job.into();
        active.translation_job_uid = Set(created.translation_job_uid);
        active.status = Set(status);
        active.first_synced_at = Set(Some(now.into()));
        active.last_synced_at = Set(Some(now.into()));
        active.updated_at = Set(now.into());
        let job = self.job_repo.update_in(txn, active).await?;
        info!(
            job_id = %job.id,
            job_uid = %job.translation_job_uid,
            status = ?job.status,
            "Created vendor job"
        );

        let file_uri = if job.file_uri.is_empty() {
            upload_file_uri(&job)
        } else {
            job.file_uri.clone()
        };
        let batch_uid = self
            .vendor
            .create_batch(&job.translation_job_uid, std::slice::from_ref(&file_uri))
            .await?;

        let entries = self
            .catalog
            .export_po(&job.source_content_type, &job.source_object_id)
            .await?;
        self.vendor
            .upload_file_to_batch(&batch_uid, &file_uri, po::render(&entries), &locale_ids)
            .await?;

        let mut active: job::ActiveModel = job.into();
        active.file_uri = Set(file_uri);
        let job = self.job_repo.update_in(txn, active).await?;
        info!(job_id = %job.id, file_uri = %job.file_uri, batch_uid = %batch_uid, "Uploaded source file");

        self.push_visual_context(&job).await?;

        Ok(SyncReport {
            job,
            previous_status,
            imported: Vec::new(),
        })
    }

    /// Send the job's page to the vendor as visual context.
    ///
    /// No provider and a declined page are fine; any other failure aborts
    /// the sync.
    async fn push_visual_context(&self, job: &job::Model) -> Result<(), SyncError> {
        let Some(provider) = &self.visual_context else {
            debug!(job_id = %job.id, "No visual context provider configured");
            return Ok(());
        };

        match provider.visual_context(job).await? {
            VisualContext::Provided { url, html } => {
                self.vendor
                    .add_visual_context(&job.translation_job_uid, &url, html)
                    .await?;
                info!(job_id = %job.id, url = %url, "Sent visual context");
            }
            VisualContext::Declined(reason) => {
                debug!(job_id = %job.id, reason = %reason, "Visual context declined");
            }
        }
        Ok(())
    }

    async fn status_sync(
        &self,
        txn: &DatabaseTransaction,
        job: job::Model,
    ) -> Result<SyncReport, SyncError> {
        info!(job_id = %job.id, status = ?job.status, "Syncing job status");
        let previous_status = job.status;

        let mut active: job::ActiveModel = job.clone().into();
        match self.vendor.get_job_details(&job.translation_job_uid).await {
            Ok(details) => {
                let status = JobStatus::from_vendor(&details.job_status)
                    .ok_or_else(|| SyncError::UnknownStatus(details.job_status.clone()))?;
                active.status = Set(status);
                active.description = Set(details.description.unwrap_or_default());
                active.reference_number = Set(details.reference_number.unwrap_or_default());
                active.due_date = Set(details.due_date.map(Into::into));
            }
            Err(ClientError::JobNotFound(uid)) => {
                warn!(job_id = %job.id, job_uid = %uid, "Job not found on vendor, marking as deleted");
                active.status = Set(JobStatus::Deleted);
            }
            Err(e) => return Err(e.into()),
        }

        let now = Utc::now();
        active.last_synced_at = Set(Some(now.into()));
        active.updated_at = Set(now.into());
        let job = self.job_repo.update_in(txn, active).await?;

        let mut report = SyncReport {
            job,
            previous_status,
            imported: Vec::new(),
        };

        if !report.status_changed() {
            info!(job_id = %report.job.id, "No change in status");
            return Ok(report);
        }
        info!(
            job_id = %report.job.id,
            from = ?previous_status,
            to = ?report.job.status,
            "Job status changed"
        );

        if !previous_status.is_pending() {
            info!(job_id = %report.job.id, "Job already finalised, nothing to do");
            return Ok(report);
        }

        let status = report.job.status;
        if status.is_translated() {
            report.imported = self.download_and_apply(txn, &report.job).await?;

            let mut active: job::ActiveModel = report.job.clone().into();
            active.translations_imported_at = Set(Some(now.into()));
            report.job = self.job_repo.update_in(txn, active).await?;
        } else if status.is_untranslated() {
            warn!(job_id = %report.job.id, status = ?status, "Job finalised without translations");
        } else {
            debug!(job_id = %report.job.id, "Job still pending");
        }

        Ok(report)
    }

    /// Import every translated file of a job.
    ///
    /// All archive entries are checked against the job's file URI, and
    /// every matched file is decoded, before anything is imported.
    async fn download_and_apply(
        &self,
        txn: &DatabaseTransaction,
        job: &job::Model,
    ) -> Result<Vec<job_translation::Model>, SyncError> {
        info!(job_id = %job.id, file_uri = %job.file_uri, "Downloading translations");

        let files = {
            let mut archive = self.vendor.download_translations(&job.file_uri).await?;
            let entries = archive.files()?;
            let mut files = Vec::with_capacity(entries.len());
            for entry in entries {
                let (vendor_locale, file_uri) = entry
                    .path
                    .split_once('/')
                    .filter(|(locale, uri)| !locale.is_empty() && !uri.contains('/'))
                    .ok_or_else(|| SyncError::MalformedArchiveEntry(entry.path.clone()))?;

                if file_uri != job.file_uri {
                    return Err(SyncError::FileUriMismatch {
                        expected: job.file_uri.clone(),
                        found: file_uri.to_string(),
                    });
                }

                files.push(TranslatedFile {
                    vendor_locale: vendor_locale.to_string(),
                    content: entry.content,
                });
            }
            files
        };

        let translations = self.job_repo.translations_in(txn, &job.id).await?;

        // Decode every file before the first import so a bad file leaves
        // the CMS untouched.
        let mut decoded = Vec::new();
        for file in files {
            let locale = self.formatter.to_cms(&file.vendor_locale)?;
            let Some(translation) = translations.iter().find(|t| t.locale == locale) else {
                info!(job_id = %job.id, locale = %locale, "No translation for locale, skipping");
                continue;
            };

            let content = String::from_utf8(file.content).map_err(|e| {
                AppError::Validation(format!(
                    "Translated file for {} is not UTF-8: {e}",
                    file.vendor_locale
                ))
            })?;
            decoded.push((translation, locale, po::parse(&content)?));
        }

        let mut imported = Vec::with_capacity(decoded.len());
        for (translation, locale, entries) in decoded {
            self.catalog
                .import_translation(job, translation, entries)
                .await?;

            let translation = self
                .job_repo
                .mark_translation_imported_in(txn, translation.clone(), Utc::now())
                .await?;
            info!(
                job_id = %job.id,
                translation_id = %translation.translation_id,
                locale = %locale,
                "Imported translation"
            );
            imported.push(translation);
        }

        Ok(imported)
    }

    async fn dispatch_events(&self, report: &SyncReport) {
        for translation in &report.imported {
            if let Err(e) = self
                .events
                .translation_imported(&report.job, translation)
                .await
            {
                warn!(job_id = %report.job.id, translation_id = %translation.translation_id, error = %e, "Translation imported handler failed");
            }
        }

        if report.imported.is_empty() {
            return;
        }
        if let Err(e) = self
            .events
            .import_successful(&report.job, &report.imported)
            .await
        {
            warn!(job_id = %report.job.id, error = %e, "Import successful handler failed");
        }
    }
}

async fn rollback(txn: DatabaseTransaction, job_id: &str) {
    if let Err(e) = txn.rollback().await {
        warn!(job_id = %job_id, error = %e, "Rollback failed");
    }
}
