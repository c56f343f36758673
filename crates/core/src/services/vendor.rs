//! Vendor API seam.
//!
//! The sync engine talks to the vendor through [`VendorApi`] so it can run
//! against the real [`SmartlingClient`] or an in-process stand-in.

use std::sync::Arc;

use async_trait::async_trait;
use locsync_smartling::{
    ClientError, CreateJobParams, JobDetails, JobList, ProjectDetails, SmartlingClient,
    TranslationsArchive,
};

/// Vendor operations used by the core services.
#[async_trait]
pub trait VendorApi: Send + Sync {
    /// Vendor project identifier.
    fn project_id(&self) -> &str;

    async fn get_project_details(&self) -> Result<ProjectDetails, ClientError>;

    async fn list_jobs(&self, name: Option<&str>) -> Result<JobList, ClientError>;

    async fn create_job(&self, params: &CreateJobParams) -> Result<JobDetails, ClientError>;

    /// Fails with [`ClientError::JobNotFound`] when the vendor no longer knows the job.
    async fn get_job_details(&self, job_uid: &str) -> Result<JobDetails, ClientError>;

    async fn create_batch(&self, job_uid: &str, file_uris: &[String])
    -> Result<String, ClientError>;

    async fn upload_file_to_batch(
        &self,
        batch_uid: &str,
        file_uri: &str,
        content: String,
        locale_ids_to_authorize: &[String],
    ) -> Result<(), ClientError>;

    async fn add_visual_context(
        &self,
        job_uid: &str,
        page_url: &str,
        html: Vec<u8>,
    ) -> Result<String, ClientError>;

    async fn download_translations(
        &self,
        file_uri: &str,
    ) -> Result<TranslationsArchive, ClientError>;
}

#[async_trait]
impl VendorApi for SmartlingClient {
    fn project_id(&self) -> &str {
        Self::project_id(self)
    }

    async fn get_project_details(&self) -> Result<ProjectDetails, ClientError> {
        Self::get_project_details(self).await
    }

    async fn list_jobs(&self, name: Option<&str>) -> Result<JobList, ClientError> {
        Self::list_jobs(self, name).await
    }

    async fn create_job(&self, params: &CreateJobParams) -> Result<JobDetails, ClientError> {
        Self::create_job(self, params).await
    }

    async fn get_job_details(&self, job_uid: &str) -> Result<JobDetails, ClientError> {
        Self::get_job_details(self, job_uid).await
    }

    async fn create_batch(
        &self,
        job_uid: &str,
        file_uris: &[String],
    ) -> Result<String, ClientError> {
        Self::create_batch(self, job_uid, file_uris).await
    }

    async fn upload_file_to_batch(
        &self,
        batch_uid: &str,
        file_uri: &str,
        content: String,
        locale_ids_to_authorize: &[String],
    ) -> Result<(), ClientError> {
        Self::upload_file_to_batch(self, batch_uid, file_uri, content, locale_ids_to_authorize)
            .await
    }

    async fn add_visual_context(
        &self,
        job_uid: &str,
        page_url: &str,
        html: Vec<u8>,
    ) -> Result<String, ClientError> {
        Self::add_visual_context(self, job_uid, page_url, html).await
    }

    async fn download_translations(
        &self,
        file_uri: &str,
    ) -> Result<TranslationsArchive, ClientError> {
        Self::download_translations(self, file_uri).await
    }
}

/// Type alias for a shared vendor.
pub type Vendor = Arc<dyn VendorApi>;
