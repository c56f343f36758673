//! Job submission service.
//!
//! Entry point for the CMS when an editor sends content for translation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use locsync_common::{AppError, AppResult, IdGenerator};
use locsync_db::entities::job::JobStatus;
use locsync_db::entities::{job, job_translation};
use locsync_db::repositories::JobRepository;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};
use validator::Validate;

use super::callbacks::JobDescriberService;
use super::catalog::{Catalog, SourceDescription, TranslationTarget};
use super::project_cache::ProjectCache;
use super::vendor::Vendor;
use crate::content_hash::compute_content_hash;

/// Maximum job name length accepted by the vendor.
pub const MAX_JOB_NAME_LENGTH: usize = 170;

/// Maximum job description length accepted by the vendor.
pub const MAX_JOB_DESCRIPTION_LENGTH: usize = 2000;

/// Input for submitting a source for translation.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitJobInput {
    #[validate(length(min = 1))]
    pub content_type: String,
    #[validate(length(min = 1))]
    pub object_id: String,
    #[validate(length(min = 1))]
    pub translations: Vec<TranslationTargetInput>,
    pub user_id: Option<String>,
    #[validate(length(min = 1, max = 170))]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(length(max = 255))]
    pub reference_number: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationTargetInput {
    pub translation_id: String,
    pub locale: String,
}

impl From<TranslationTargetInput> for TranslationTarget {
    fn from(input: TranslationTargetInput) -> Self {
        Self {
            translation_id: input.translation_id,
            locale: input.locale,
        }
    }
}

/// Result of a submission.
#[derive(Debug, Clone)]
pub enum Submission {
    /// A new unsynced job was stored.
    Created {
        job: job::Model,
        translations: Vec<job_translation::Model>,
    },
    /// An unsynced or pending job already covers this content.
    Existing(job::Model),
}

impl Submission {
    #[must_use]
    pub const fn job(&self) -> &job::Model {
        match self {
            Self::Created { job, .. } | Self::Existing(job) => job,
        }
    }

    #[must_use]
    pub const fn is_created(&self) -> bool {
        matches!(self, Self::Created { .. })
    }
}

/// Default vendor job name: `[{prefix} ]{hash8} #{object_id}`.
#[must_use]
pub fn default_job_name(prefix: Option<&str>, object_id: &str, now: DateTime<Utc>) -> String {
    let digest = Sha256::digest(format!("{object_id}{}", now.to_rfc3339()).as_bytes());
    let hash = hex::encode(digest);
    let short = &hash[..8];

    match prefix.map(str::trim).filter(|p| !p.is_empty()) {
        Some(prefix) => format!("{prefix} {short} #{object_id}"),
        None => format!("{short} #{object_id}"),
    }
}

#[must_use]
pub fn default_job_description(source: &SourceDescription) -> String {
    format!(
        "CMS translation job for {} '{}'.",
        source.kind, source.title
    )
}

/// Submission service.
#[derive(Clone)]
pub struct SubmissionService {
    job_repo: JobRepository,
    project_cache: Arc<ProjectCache>,
    vendor: Vendor,
    catalog: Catalog,
    describer: Option<JobDescriberService>,
    name_prefix: Option<String>,
    id_gen: IdGenerator,
}

impl SubmissionService {
    #[must_use]
    pub const fn new(
        job_repo: JobRepository,
        project_cache: Arc<ProjectCache>,
        vendor: Vendor,
        catalog: Catalog,
    ) -> Self {
        Self {
            job_repo,
            project_cache,
            vendor,
            catalog,
            describer: None,
            name_prefix: None,
            id_gen: IdGenerator::new(),
        }
    }

    #[must_use]
    pub fn with_describer(mut self, describer: JobDescriberService) -> Self {
        self.describer = Some(describer);
        self
    }

    #[must_use]
    pub fn with_name_prefix(mut self, prefix: Option<String>) -> Self {
        self.name_prefix = prefix;
        self
    }

    /// Store an unsynced job for a source, unless an equivalent one exists.
    ///
    /// A job is equivalent when it covers the same source with the same
    /// content hash and is still unsynced or pending. Target locales are
    /// not compared.
    pub async fn get_or_create_job(&self, input: SubmitJobInput) -> AppResult<Submission> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let now = Utc::now();
        if let Some(due_date) = input.due_date
            && due_date <= now
        {
            return Err(AppError::Validation(
                "Due date must be in the future".to_string(),
            ));
        }

        let entries = self
            .catalog
            .export_po(&input.content_type, &input.object_id)
            .await?;
        let content_hash = compute_content_hash(&entries);

        if let Some(existing) = self
            .job_repo
            .find_duplicate(&input.content_type, &input.object_id, &content_hash)
            .await?
        {
            info!(
                job_id = %existing.id,
                status = ?existing.status,
                "Equivalent job already exists, not creating another"
            );
            return Ok(Submission::Existing(existing));
        }

        let name = match input.name {
            Some(name) => {
                self.ensure_name_available(&name).await?;
                name
            }
            None => default_job_name(self.name_prefix.as_deref(), &input.object_id, now),
        };

        let targets: Vec<TranslationTarget> =
            input.translations.into_iter().map(Into::into).collect();

        let description = match input.description {
            Some(description) => description,
            None => {
                let source = self
                    .catalog
                    .describe_source(&input.content_type, &input.object_id)
                    .await?;
                let default = default_job_description(&source);
                match &self.describer {
                    Some(describer) => describer.describe(&default, &source, &targets),
                    None => default,
                }
            }
        };
        if description.chars().count() > MAX_JOB_DESCRIPTION_LENGTH {
            return Err(AppError::Validation(format!(
                "Job description must be at most {MAX_JOB_DESCRIPTION_LENGTH} characters"
            )));
        }
        if name.chars().count() > MAX_JOB_NAME_LENGTH {
            return Err(AppError::Validation(format!(
                "Job name must be at most {MAX_JOB_NAME_LENGTH} characters"
            )));
        }

        let project = self.project_cache.get().await?;

        let job_id = self.id_gen.generate();
        let model = job::ActiveModel {
            id: Set(job_id.clone()),
            project_id: Set(project.project.id.clone()),
            source_content_type: Set(input.content_type),
            source_object_id: Set(input.object_id),
            user_id: Set(input.user_id),
            name: Set(name),
            description: Set(description),
            reference_number: Set(input.reference_number.unwrap_or_default()),
            due_date: Set(input.due_date.map(Into::into)),
            translation_job_uid: Set(String::new()),
            status: Set(JobStatus::Unsynced),
            first_synced_at: Set(None),
            last_synced_at: Set(None),
            file_uri: Set(String::new()),
            content_hash: Set(content_hash),
            translations_imported_at: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let translations = targets
            .into_iter()
            .map(|target| job_translation::ActiveModel {
                id: Set(self.id_gen.generate()),
                job_id: Set(job_id.clone()),
                translation_id: Set(target.translation_id),
                locale: Set(target.locale),
                imported_at: Set(None),
                created_at: Set(now.into()),
            })
            .collect();

        let (job, translations) = self
            .job_repo
            .create_with_translations(model, translations)
            .await?;

        info!(
            job_id = %job.id,
            name = %job.name,
            translations = translations.len(),
            "Created translation job"
        );

        Ok(Submission::Created { job, translations })
    }

    async fn ensure_name_available(&self, name: &str) -> AppResult<()> {
        let jobs = self
            .vendor
            .list_jobs(Some(name))
            .await
            .map_err(|e| AppError::ExternalService(e.to_string()))?;

        if jobs.items.iter().any(|j| j.job_name == name) {
            return Err(AppError::Conflict(format!(
                "A vendor job named {name:?} already exists"
            )));
        }
        Ok(())
    }

    /// Fill in the content hash of jobs created without one.
    ///
    /// Returns the number of jobs updated.
    pub async fn populate_missing_hashes(&self, batch_size: u64) -> AppResult<usize> {
        let mut updated = 0;
        loop {
            let jobs = self.job_repo.find_missing_hash(batch_size.max(1)).await?;
            if jobs.is_empty() {
                break;
            }

            for job in jobs {
                let entries = self
                    .catalog
                    .export_po(&job.source_content_type, &job.source_object_id)
                    .await?;
                let hash = compute_content_hash(&entries);
                self.job_repo.set_content_hash(&job.id, &hash).await?;
                debug!(job_id = %job.id, "Populated content hash");
                updated += 1;
            }
        }
        Ok(updated)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::callbacks::JobDescriber;
    use crate::services::catalog::ContentCatalog;
    use crate::services::project_cache::CurrentProject;
    use crate::services::testing::{
        FakeCatalog, FakeVendor, test_job, test_project, test_translation,
    };
    use chrono::Duration;
    use locsync_db::repositories::ProjectRepository;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};

    fn input() -> SubmitJobInput {
        SubmitJobInput {
            content_type: "page".to_string(),
            object_id: "42".to_string(),
            translations: vec![TranslationTargetInput {
                translation_id: "t1".to_string(),
                locale: "fr".to_string(),
            }],
            user_id: Some("user1".to_string()),
            name: None,
            description: None,
            reference_number: None,
            due_date: None,
        }
    }

    async fn service(db: DatabaseConnection, vendor: Arc<FakeVendor>) -> SubmissionService {
        let db = Arc::new(db);
        let cache = Arc::new(ProjectCache::new(
            ProjectRepository::new(db.clone()),
            vendor.clone(),
            "production",
        ));
        cache
            .prime(CurrentProject {
                project: test_project(),
                target_locales: vec![],
            })
            .await;

        SubmissionService::new(
            JobRepository::new(db),
            cache,
            vendor,
            Arc::new(FakeCatalog::default()),
        )
    }

    #[test]
    fn test_default_job_name() {
        let now = Utc::now();
        let name = default_job_name(None, "42", now);
        let (hash, rest) = name.split_once(' ').unwrap();
        assert_eq!(hash.len(), 8);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(rest, "#42");

        let prefixed = default_job_name(Some("Website"), "42", now);
        assert_eq!(prefixed, format!("Website {name}"));

        assert_ne!(default_job_name(None, "42", now + Duration::seconds(1)), name);
    }

    #[test]
    fn test_default_job_description() {
        let source = SourceDescription {
            content_type: "page".to_string(),
            object_id: "42".to_string(),
            kind: "page".to_string(),
            title: "About us".to_string(),
        };
        assert_eq!(
            default_job_description(&source),
            "CMS translation job for page 'About us'."
        );
    }

    #[tokio::test]
    async fn test_existing_pending_job_is_reused() {
        let existing = test_job("job1", JobStatus::Draft);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[existing.clone()]])
            .into_connection();
        let vendor = Arc::new(FakeVendor::default());

        let submission = service(db, vendor.clone())
            .await
            .get_or_create_job(input())
            .await
            .unwrap();

        assert!(!submission.is_created());
        assert_eq!(submission.job().id, "job1");
        assert_eq!(vendor.calls("list_jobs"), 0);
    }

    #[tokio::test]
    async fn test_creates_unsynced_job() {
        let created = test_job("job2", JobStatus::Unsynced);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<job::Model>::new()])
            .append_query_results([[created]])
            .append_query_results([[test_translation("t1", "job2", "fr")]])
            .into_connection();

        let submission = service(db, Arc::new(FakeVendor::default()))
            .await
            .get_or_create_job(input())
            .await
            .unwrap();

        match submission {
            Submission::Created { job, translations } => {
                assert_eq!(job.status, JobStatus::Unsynced);
                assert_eq!(translations.len(), 1);
            }
            Submission::Existing(_) => panic!("expected a new job"),
        }
    }

    #[tokio::test]
    async fn test_duplicate_lookup_uses_content_hash() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<job::Model>::new()])
                .append_query_results([[test_job("job2", JobStatus::Unsynced)]])
                .append_query_results([[test_translation("t1", "job2", "fr")]])
                .into_connection(),
        );
        let vendor = Arc::new(FakeVendor::default());
        let cache = Arc::new(ProjectCache::new(
            ProjectRepository::new(db.clone()),
            vendor.clone(),
            "production",
        ));
        cache
            .prime(CurrentProject {
                project: test_project(),
                target_locales: vec![],
            })
            .await;
        let catalog = FakeCatalog::default();
        let expected_hash = compute_content_hash(&catalog.export_po("page", "42").await.unwrap());

        SubmissionService::new(JobRepository::new(db.clone()), cache, vendor, Arc::new(catalog))
            .get_or_create_job(input())
            .await
            .unwrap();

        let log = format!("{:?}", Arc::try_unwrap(db).unwrap().into_transaction_log());
        assert!(log.contains(&expected_hash));
    }

    #[tokio::test]
    async fn test_supplied_name_must_be_unique() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<job::Model>::new()])
            .into_connection();
        let vendor = Arc::new(FakeVendor::default().with_existing_job("Spring launch"));

        let result = service(db, vendor.clone())
            .await
            .get_or_create_job(SubmitJobInput {
                name: Some("Spring launch".to_string()),
                ..input()
            })
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
        assert_eq!(vendor.calls("list_jobs"), 1);
    }

    #[tokio::test]
    async fn test_rejects_past_due_date() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let result = service(db, Arc::new(FakeVendor::default()))
            .await
            .get_or_create_job(SubmitJobInput {
                due_date: Some(Utc::now() - Duration::hours(1)),
                ..input()
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_rejects_long_name() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let result = service(db, Arc::new(FakeVendor::default()))
            .await
            .get_or_create_job(SubmitJobInput {
                name: Some("x".repeat(MAX_JOB_NAME_LENGTH + 1)),
                ..input()
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_describer_overrides_description() {
        struct Shouting;

        impl JobDescriber for Shouting {
            fn describe(
                &self,
                default: &str,
                _source: &SourceDescription,
                translations: &[TranslationTarget],
            ) -> String {
                format!("{} ({} locales)", default.to_uppercase(), translations.len())
            }
        }

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<job::Model>::new()])
                .append_query_results([[test_job("job2", JobStatus::Unsynced)]])
                .append_query_results([[test_translation("t1", "job2", "fr")]])
                .into_connection(),
        );
        let vendor = Arc::new(FakeVendor::default());
        let cache = Arc::new(ProjectCache::new(
            ProjectRepository::new(db.clone()),
            vendor.clone(),
            "production",
        ));
        cache
            .prime(CurrentProject {
                project: test_project(),
                target_locales: vec![],
            })
            .await;

        SubmissionService::new(
            JobRepository::new(db.clone()),
            cache,
            vendor,
            Arc::new(FakeCatalog::default()),
        )
        .with_describer(Arc::new(Shouting))
        .get_or_create_job(input())
        .await
        .unwrap();

        let log = format!("{:?}", Arc::try_unwrap(db).unwrap().into_transaction_log());
        assert!(log.contains("CMS TRANSLATION JOB FOR PAGE 'ABOUT US'. (1 locales)"));
    }
}
