//! HTTP client for the Smartling REST API.

use std::time::{Duration, Instant};

use bytes::{Bytes, BytesMut};
use chrono::{SecondsFormat, Utc};
use futures::StreamExt;
use locsync_common::SmartlingConfig;
use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, info};
use url::Url;

use crate::archive::TranslationsArchive;
use crate::envelope::{decode_accepted, decode_data, decode_error};
use crate::error::ClientError;
use crate::token::{TokenAction, TokenState};
use crate::types::{
    ContextUpload, CreateBatchBody, CreateJobBody, CreateJobParams, CreatedBatch, JobDetails,
    JobList, ProjectDetails, TokenGrant,
};
use crate::urls::visual_context_filename;

const NOT_FOUND_ERROR: &str = "NOT_FOUND_ERROR";

/// Vendor API client.
///
/// Holds the bearer tokens for the process; share it behind an `Arc`.
pub struct SmartlingClient {
    http: Client,
    base_url: Url,
    project_id: String,
    user_identifier: String,
    user_secret: String,
    tokens: Mutex<TokenState>,
}

impl std::fmt::Debug for SmartlingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmartlingClient")
            .field("base_url", &self.base_url.as_str())
            .field("project_id", &self.project_id)
            .finish_non_exhaustive()
    }
}

impl SmartlingClient {
    /// Create a client from configuration.
    pub fn new(config: &SmartlingConfig) -> Result<Self, ClientError> {
        let timeout = config.api_timeout();
        let http = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .user_agent(concat!("locsync/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let base_url = Url::parse(config.resolved_base_url())
            .map_err(|e| ClientError::InvalidRequest(format!("Invalid base URL: {e}")))?;

        Ok(Self {
            http,
            base_url,
            project_id: config.project_id.clone(),
            user_identifier: config.user_identifier.clone(),
            user_secret: config.user_secret.clone(),
            tokens: Mutex::new(TokenState::default()),
        })
    }

    /// Vendor project this client operates on.
    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Drop cached tokens so the next call authenticates again.
    pub async fn reset_tokens(&self) {
        self.tokens.lock().await.clear();
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidRequest("Base URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<reqwest::Response, ClientError> {
        let request = builder.build()?;
        let method = request.method().clone();
        let url = request.url().clone();

        debug!(method = %method, url = %url, "Smartling API request");
        let started = Instant::now();
        let response = self.http.execute(request).await?;
        debug!(
            method = %method,
            url = %url,
            status = response.status().as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Smartling API response"
        );

        Ok(response)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<(StatusCode, Bytes), ClientError> {
        let response = self.execute(builder).await?;
        let status = response.status();
        let body = response.bytes().await?;
        Ok((status, body))
    }

    /// Authorization header value, refreshing or re-authenticating first if needed.
    async fn authorization(&self) -> Result<String, ClientError> {
        let mut tokens = self.tokens.lock().await;
        match tokens.action(Utc::now()) {
            TokenAction::Ready(header) => Ok(header),
            TokenAction::Refresh(refresh_token) => {
                debug!("Refreshing Smartling access token");
                let grant = self.refresh_grant(&refresh_token).await?;
                Ok(tokens.update(grant, Utc::now()))
            }
            TokenAction::Authenticate => {
                debug!("Authenticating with Smartling");
                let grant = self.authenticate_grant().await?;
                Ok(tokens.update(grant, Utc::now()))
            }
        }
    }

    async fn authenticate_grant(&self) -> Result<TokenGrant, ClientError> {
        let url = self.endpoint(&["auth-api", "v2", "authenticate"])?;
        let (status, body) = self
            .send(self.http.post(url).json(&serde_json::json!({
                "userIdentifier": self.user_identifier,
                "userSecret": self.user_secret,
            })))
            .await?;
        decode_data(status, &body)
    }

    async fn refresh_grant(&self, refresh_token: &str) -> Result<TokenGrant, ClientError> {
        let url = self.endpoint(&["auth-api", "v2", "authenticate", "refresh"])?;
        let (status, body) = self
            .send(
                self.http
                    .post(url)
                    .json(&serde_json::json!({ "refreshToken": refresh_token })),
            )
            .await?;
        decode_data(status, &body)
    }

    async fn authorized(&self, method: Method, url: Url) -> Result<RequestBuilder, ClientError> {
        let header = self.authorization().await?;
        Ok(self.http.request(method, url).header(AUTHORIZATION, header))
    }

    async fn request_data<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ClientError> {
        let (status, body) = self.send(builder).await?;
        decode_data(status, &body)
    }

    /// Fetch the project, disabled target locales included.
    pub async fn get_project_details(&self) -> Result<ProjectDetails, ClientError> {
        let url = self.endpoint(&["projects-api", "v2", "projects", &self.project_id])?;
        let builder = self
            .authorized(Method::GET, url)
            .await?
            .query(&[("includeDisabledLocales", "true")]);
        self.request_data(builder).await
    }

    /// List jobs, optionally filtered by name.
    pub async fn list_jobs(&self, name: Option<&str>) -> Result<JobList, ClientError> {
        let url = self.endpoint(&["jobs-api", "v3", "projects", &self.project_id, "jobs"])?;
        let mut builder = self.authorized(Method::GET, url).await?;
        if let Some(name) = name {
            builder = builder.query(&[("jobName", name)]);
        }
        self.request_data(builder).await
    }

    /// Create a job.
    pub async fn create_job(&self, params: &CreateJobParams) -> Result<JobDetails, ClientError> {
        if params.callback_url.is_some() != params.callback_method.is_some() {
            return Err(ClientError::InvalidRequest(
                "Both callback_url and callback_method must be provided, or neither".to_string(),
            ));
        }

        let body = CreateJobBody {
            job_name: &params.job_name,
            target_locale_ids: &params.target_locale_ids,
            description: params.description.as_deref(),
            reference_number: params.reference_number.as_deref(),
            due_date: params
                .due_date
                .map(|d| d.to_rfc3339_opts(SecondsFormat::Secs, true)),
            callback_url: params.callback_url.as_deref(),
            callback_method: params.callback_method,
        };

        let url = self.endpoint(&["jobs-api", "v3", "projects", &self.project_id, "jobs"])?;
        let builder = self.authorized(Method::POST, url).await?.json(&body);
        self.request_data(builder).await
    }

    /// Fetch a job. A vendor `NOT_FOUND_ERROR` becomes [`ClientError::JobNotFound`].
    pub async fn get_job_details(&self, job_uid: &str) -> Result<JobDetails, ClientError> {
        let url = self.endpoint(&[
            "jobs-api",
            "v3",
            "projects",
            &self.project_id,
            "jobs",
            job_uid,
        ])?;
        let builder = self.authorized(Method::GET, url).await?;
        match self.request_data(builder).await {
            Err(err) if err.code() == Some(NOT_FOUND_ERROR) => {
                Err(ClientError::JobNotFound(job_uid.to_string()))
            }
            other => other,
        }
    }

    /// Create an unauthorized upload batch for a job. Returns the batch UID.
    pub async fn create_batch(
        &self,
        job_uid: &str,
        file_uris: &[String],
    ) -> Result<String, ClientError> {
        let url = self.endpoint(&[
            "job-batches-api",
            "v2",
            "projects",
            &self.project_id,
            "batches",
        ])?;
        let body = CreateBatchBody {
            authorize: false,
            translation_job_uid: job_uid,
            file_uris,
        };
        let builder = self.authorized(Method::POST, url).await?.json(&body);
        let batch: CreatedBatch = self.request_data(builder).await?;
        Ok(batch.batch_uid)
    }

    /// Upload a gettext file into a batch.
    pub async fn upload_file_to_batch(
        &self,
        batch_uid: &str,
        file_uri: &str,
        content: String,
        locale_ids_to_authorize: &[String],
    ) -> Result<(), ClientError> {
        let url = self.endpoint(&[
            "job-batches-api",
            "v2",
            "projects",
            &self.project_id,
            "batches",
            batch_uid,
            "file",
        ])?;

        let file = Part::text(content)
            .file_name(file_uri.to_string())
            .mime_str("text/x-gettext-translation")?;
        let mut form = Form::new()
            .part("file", file)
            .text("fileUri", file_uri.to_string())
            .text("fileType", "gettext");
        for locale_id in locale_ids_to_authorize {
            form = form.text("localeIdsToAuthorize[]", locale_id.clone());
        }

        let builder = self.authorized(Method::POST, url).await?.multipart(form);
        let (status, body) = self.send(builder).await?;
        let code = decode_accepted(status, &body)?;
        debug!(batch_uid = %batch_uid, file_uri = %file_uri, code = %code, "Uploaded file to batch");
        Ok(())
    }

    /// Upload a rendered page as visual context and match it to a job.
    /// Returns the vendor process UID.
    pub async fn add_visual_context(
        &self,
        job_uid: &str,
        page_url: &str,
        html: Vec<u8>,
    ) -> Result<String, ClientError> {
        let url = self.endpoint(&[
            "context-api",
            "v2",
            "projects",
            &self.project_id,
            "contexts",
            "upload-and-match-async",
        ])?;

        let content = Part::bytes(html)
            .file_name(visual_context_filename(page_url))
            .mime_str("text/html")?;
        let match_params = serde_json::json!({ "translationJobUids": [job_uid] });
        let form = Form::new()
            .part("content", content)
            .text("name", page_url.to_string())
            .text("matchparams", match_params.to_string());

        info!(job_uid = %job_uid, url = %page_url, "Sending visual context");
        let builder = self.authorized(Method::POST, url).await?.multipart(form);
        let upload: ContextUpload = self.request_data(builder).await?;
        info!(process_uid = %upload.process_uid, "Visual context sent");
        Ok(upload.process_uid)
    }

    /// Download the published translations of a file for all locales.
    pub async fn download_translations(
        &self,
        file_uri: &str,
    ) -> Result<TranslationsArchive, ClientError> {
        let url = self.endpoint(&[
            "files-api",
            "v2",
            "projects",
            &self.project_id,
            "locales",
            "all",
            "file",
            "zip",
        ])?;
        let builder = self.authorized(Method::GET, url).await?.query(&[
            ("fileUri", file_uri),
            ("retrievalType", "published"),
            ("includeOriginalStrings", "false"),
        ]);

        let response = self.execute(builder).await?;
        let status = response.status();

        // Only a 200 carries the ZIP; anything else is an error envelope.
        if status != StatusCode::OK {
            let body = response.bytes().await?;
            return Err(decode_error(status, &body));
        }

        let mut buffer = BytesMut::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            buffer.extend_from_slice(&chunk?);
        }

        TranslationsArchive::from_bytes(buffer.freeze())
    }
}
