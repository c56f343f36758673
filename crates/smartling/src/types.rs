//! Request and response payloads.

#![allow(missing_docs)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Token grant returned by the authenticate and refresh endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenGrant {
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    /// Refresh token lifetime in seconds.
    pub refresh_expires_in: i64,
    pub refresh_token: String,
    pub token_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetLocale {
    pub description: String,
    pub enabled: bool,
    pub locale_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetails {
    pub account_uid: String,
    pub archived: bool,
    pub project_id: String,
    pub project_name: String,
    pub project_type_code: String,
    pub source_locale_description: String,
    pub source_locale_id: String,
    pub target_locales: Vec<TargetLocale>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListItem {
    pub job_name: String,
    #[serde(default)]
    pub translation_job_uid: Option<String>,
    #[serde(default)]
    pub job_status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobList {
    pub items: Vec<JobListItem>,
    #[serde(default)]
    pub total_count: Option<u64>,
}

/// HTTP method the vendor uses to call a job callback URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CallbackMethod {
    Get,
    Post,
}

/// Arguments for creating a vendor job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateJobParams {
    pub job_name: String,
    pub target_locale_ids: Vec<String>,
    pub description: Option<String>,
    pub reference_number: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub callback_url: Option<String>,
    pub callback_method: Option<CallbackMethod>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateJobBody<'a> {
    pub job_name: &'a str,
    pub target_locale_ids: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_number: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_method: Option<CallbackMethod>,
}

/// A vendor job as returned by the create and detail endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDetails {
    pub translation_job_uid: String,
    pub job_name: String,
    pub job_status: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub reference_number: Option<String>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub target_locale_ids: Vec<String>,
    #[serde(default)]
    pub job_number: Option<String>,
    #[serde(default)]
    pub created_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub modified_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub source_files: Vec<SourceFile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceFile {
    pub name: String,
    pub uri: String,
    #[serde(default)]
    pub file_uid: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateBatchBody<'a> {
    pub authorize: bool,
    pub translation_job_uid: &'a str,
    pub file_uris: &'a [String],
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreatedBatch {
    pub batch_uid: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ContextUpload {
    pub process_uid: String,
}
