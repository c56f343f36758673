//! In-process stand-ins for the vendor, the CMS, and event consumers.

#![allow(clippy::unwrap_used)]

use std::io::{Cursor, Write};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use locsync_common::{AppError, AppResult};
use locsync_db::entities::job::JobStatus;
use locsync_db::entities::{job, job_translation, project};
use locsync_smartling::{
    ClientError, CreateJobParams, JobDetails, JobList, JobListItem, ProjectDetails,
    TranslationsArchive,
};
use zip::write::SimpleFileOptions;

use super::catalog::{ContentCatalog, SourceDescription};
use super::events::SyncEventHandler;
use super::vendor::VendorApi;
use crate::po::PoEntry;

pub(crate) fn test_project() -> project::Model {
    project::Model {
        id: "proj1".to_string(),
        environment: "production".to_string(),
        account_uid: "acct1".to_string(),
        project_uid: "proj-uid".to_string(),
        archived: false,
        name: "Website".to_string(),
        type_code: "APPLICATION_RESOURCES".to_string(),
        source_locale_id: "en".to_string(),
        source_locale_description: "English".to_string(),
        first_synced_at: Utc::now().into(),
        last_synced_at: Utc::now().into(),
    }
}

/// A job row in `status`, with sync state consistent with it.
pub(crate) fn test_job(id: &str, status: JobStatus) -> job::Model {
    let synced = status != JobStatus::Unsynced;
    let now = Utc::now();
    job::Model {
        id: id.to_string(),
        project_id: "proj1".to_string(),
        source_content_type: "page".to_string(),
        source_object_id: "42".to_string(),
        user_id: Some("user1".to_string()),
        name: "1a2b3c4d #42".to_string(),
        description: "CMS translation job for page 'About us'.".to_string(),
        reference_number: String::new(),
        due_date: None,
        translation_job_uid: if synced { "uid-1".to_string() } else { String::new() },
        status,
        first_synced_at: synced.then(|| now.into()),
        last_synced_at: synced.then(|| now.into()),
        file_uri: if synced { format!("job_{id}_42.po") } else { String::new() },
        content_hash: "hash".to_string(),
        translations_imported_at: None,
        created_at: now.into(),
        updated_at: now.into(),
    }
}

pub(crate) fn test_translation(id: &str, job_id: &str, locale: &str) -> job_translation::Model {
    job_translation::Model {
        id: format!("jt-{id}"),
        job_id: job_id.to_string(),
        translation_id: id.to_string(),
        locale: locale.to_string(),
        imported_at: None,
        created_at: Utc::now().into(),
    }
}

pub(crate) fn job_details(uid: &str, status: &str) -> JobDetails {
    JobDetails {
        translation_job_uid: uid.to_string(),
        job_name: "1a2b3c4d #42".to_string(),
        job_status: status.to_string(),
        description: Some("CMS translation job for page 'About us'.".to_string()),
        reference_number: None,
        due_date: None,
        target_locale_ids: vec!["fr-FR".to_string()],
        job_number: None,
        created_date: None,
        modified_date: None,
        source_files: vec![],
    }
}

/// ZIP archive from `(path, content)` pairs.
pub(crate) fn build_zip(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (path, content) in entries {
        writer
            .start_file(*path, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

fn not_configured(what: &str) -> ClientError {
    ClientError::InvalidResponse(format!("{what} not configured"))
}

/// Vendor stand-in that records every call.
#[derive(Default)]
pub(crate) struct FakeVendor {
    project: Option<ProjectDetails>,
    existing_jobs: Vec<JobListItem>,
    created_job: Option<JobDetails>,
    job_details: Option<JobDetails>,
    job_missing: bool,
    context_fails: bool,
    archive: Option<Vec<u8>>,
    calls: Mutex<Vec<String>>,
    pub(crate) created: Mutex<Vec<CreateJobParams>>,
    pub(crate) batches: Mutex<Vec<(String, Vec<String>)>>,
    pub(crate) uploads: Mutex<Vec<(String, String, Vec<String>)>>,
    pub(crate) contexts: Mutex<Vec<(String, String)>>,
}

impl FakeVendor {
    pub(crate) fn with_project(mut self, project: ProjectDetails) -> Self {
        self.project = Some(project);
        self
    }

    pub(crate) fn with_existing_job(mut self, name: &str) -> Self {
        self.existing_jobs.push(JobListItem {
            job_name: name.to_string(),
            translation_job_uid: Some("uid-existing".to_string()),
            job_status: Some("IN_PROGRESS".to_string()),
        });
        self
    }

    pub(crate) fn with_created_job(mut self, details: JobDetails) -> Self {
        self.created_job = Some(details);
        self
    }

    pub(crate) fn with_job_details(mut self, details: JobDetails) -> Self {
        self.job_details = Some(details);
        self
    }

    pub(crate) fn with_job_missing(mut self) -> Self {
        self.job_missing = true;
        self
    }

    pub(crate) fn with_failing_context(mut self) -> Self {
        self.context_fails = true;
        self
    }

    pub(crate) fn with_archive(mut self, archive: Vec<u8>) -> Self {
        self.archive = Some(archive);
        self
    }

    /// Number of calls made to `method`.
    pub(crate) fn calls(&self, method: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| *c == method)
            .count()
    }

    fn record(&self, method: &str) {
        self.calls.lock().unwrap().push(method.to_string());
    }
}

#[async_trait]
impl VendorApi for FakeVendor {
    fn project_id(&self) -> &str {
        "proj-uid"
    }

    async fn get_project_details(&self) -> Result<ProjectDetails, ClientError> {
        self.record("get_project_details");
        self.project
            .clone()
            .ok_or_else(|| not_configured("project"))
    }

    async fn list_jobs(&self, name: Option<&str>) -> Result<JobList, ClientError> {
        self.record("list_jobs");
        let items: Vec<JobListItem> = self
            .existing_jobs
            .iter()
            .filter(|j| name.is_none_or(|n| j.job_name.contains(n)))
            .cloned()
            .collect();
        Ok(JobList {
            total_count: Some(items.len() as u64),
            items,
        })
    }

    async fn create_job(&self, params: &CreateJobParams) -> Result<JobDetails, ClientError> {
        self.record("create_job");
        self.created.lock().unwrap().push(params.clone());
        self.created_job
            .clone()
            .ok_or_else(|| not_configured("created job"))
    }

    async fn get_job_details(&self, job_uid: &str) -> Result<JobDetails, ClientError> {
        self.record("get_job_details");
        if self.job_missing {
            return Err(ClientError::JobNotFound(job_uid.to_string()));
        }
        self.job_details
            .clone()
            .ok_or_else(|| not_configured("job details"))
    }

    async fn create_batch(
        &self,
        job_uid: &str,
        file_uris: &[String],
    ) -> Result<String, ClientError> {
        self.record("create_batch");
        self.batches
            .lock()
            .unwrap()
            .push((job_uid.to_string(), file_uris.to_vec()));
        Ok("batch-1".to_string())
    }

    async fn upload_file_to_batch(
        &self,
        batch_uid: &str,
        file_uri: &str,
        content: String,
        locale_ids_to_authorize: &[String],
    ) -> Result<(), ClientError> {
        self.record("upload_file_to_batch");
        assert_eq!(batch_uid, "batch-1");
        self.uploads.lock().unwrap().push((
            file_uri.to_string(),
            content,
            locale_ids_to_authorize.to_vec(),
        ));
        Ok(())
    }

    async fn add_visual_context(
        &self,
        job_uid: &str,
        page_url: &str,
        _html: Vec<u8>,
    ) -> Result<String, ClientError> {
        self.record("add_visual_context");
        if self.context_fails {
            return Err(ClientError::InvalidResponse("context upload rejected".to_string()));
        }
        self.contexts
            .lock()
            .unwrap()
            .push((job_uid.to_string(), page_url.to_string()));
        Ok("process-1".to_string())
    }

    async fn download_translations(
        &self,
        _file_uri: &str,
    ) -> Result<TranslationsArchive, ClientError> {
        self.record("download_translations");
        let bytes = self.archive.clone().ok_or_else(|| not_configured("archive"))?;
        TranslationsArchive::from_bytes(Bytes::from(bytes))
    }
}

/// CMS stand-in with a fixed export.
pub(crate) struct FakeCatalog {
    entries: Vec<PoEntry>,
    pub(crate) imports: Mutex<Vec<(String, Vec<PoEntry>)>>,
}

impl Default for FakeCatalog {
    fn default() -> Self {
        Self {
            entries: vec![
                PoEntry::source(Some("title"), "About us"),
                PoEntry::source(Some("body"), "We make things."),
            ],
            imports: Mutex::default(),
        }
    }
}

impl FakeCatalog {
    pub(crate) fn with_entries(entries: Vec<PoEntry>) -> Self {
        Self {
            entries,
            imports: Mutex::default(),
        }
    }

    pub(crate) fn imported_ids(&self) -> Vec<String> {
        self.imports
            .lock()
            .unwrap()
            .iter()
            .map(|(id, _)| id.clone())
            .collect()
    }
}

#[async_trait]
impl ContentCatalog for FakeCatalog {
    async fn export_po(&self, _content_type: &str, _object_id: &str) -> AppResult<Vec<PoEntry>> {
        Ok(self.entries.clone())
    }

    async fn describe_source(
        &self,
        content_type: &str,
        object_id: &str,
    ) -> AppResult<SourceDescription> {
        Ok(SourceDescription {
            content_type: content_type.to_string(),
            object_id: object_id.to_string(),
            kind: "page".to_string(),
            title: "About us".to_string(),
        })
    }

    async fn import_translation(
        &self,
        _job: &job::Model,
        translation: &job_translation::Model,
        entries: Vec<PoEntry>,
    ) -> AppResult<()> {
        if entries.is_empty() {
            return Err(AppError::Validation("empty translation".to_string()));
        }
        self.imports
            .lock()
            .unwrap()
            .push((translation.translation_id.clone(), entries));
        Ok(())
    }
}

/// Event handler that remembers what it saw.
#[derive(Default)]
pub(crate) struct RecordingHandler {
    imported: Mutex<Vec<String>>,
    batches: Mutex<Vec<Vec<String>>>,
}

impl RecordingHandler {
    pub(crate) fn imported(&self) -> Vec<String> {
        self.imported.lock().unwrap().clone()
    }

    pub(crate) fn batches(&self) -> Vec<Vec<String>> {
        self.batches.lock().unwrap().clone()
    }
}

#[async_trait]
impl SyncEventHandler for RecordingHandler {
    async fn translation_imported(
        &self,
        _job: &job::Model,
        translation: &job_translation::Model,
    ) -> AppResult<()> {
        self.imported
            .lock()
            .unwrap()
            .push(translation.translation_id.clone());
        Ok(())
    }

    async fn import_successful(
        &self,
        _job: &job::Model,
        translations: &[job_translation::Model],
    ) -> AppResult<()> {
        self.batches.lock().unwrap().push(
            translations
                .iter()
                .map(|t| t.translation_id.clone())
                .collect(),
        );
        Ok(())
    }
}
