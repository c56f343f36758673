//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `locsync_test`)
//!   `TEST_DB_PASSWORD` (default: `locsync_test`)
//!   `TEST_DB_NAME` (default: `locsync_test`)

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use chrono::Utc;
use locsync_common::IdGenerator;
use locsync_db::entities::job::{self, JobStatus};
use locsync_db::entities::job_translation;
use locsync_db::repositories::{
    JobRepository, ProjectRepository, ProjectSnapshot, TargetLocaleSnapshot,
};
use locsync_db::test_utils::{TestDatabase, TestDbConfig};
use sea_orm::{ConnectionTrait, DatabaseBackend, Set, Statement};

fn snapshot(locales: &[&str]) -> ProjectSnapshot {
    ProjectSnapshot {
        environment: "production".to_string(),
        account_uid: "acct".to_string(),
        project_uid: "abc123".to_string(),
        archived: false,
        name: "Website".to_string(),
        type_code: "APPLICATION_RESOURCES".to_string(),
        source_locale_id: "en-US".to_string(),
        source_locale_description: "English (United States)".to_string(),
        target_locales: locales
            .iter()
            .map(|l| TargetLocaleSnapshot {
                locale_id: (*l).to_string(),
                description: (*l).to_string(),
                enabled: true,
            })
            .collect(),
    }
}

async fn create_job(db: &TestDatabase, project_id: &str, hash: &str) -> job::Model {
    let id_gen = IdGenerator::new();
    let repo = JobRepository::new(db.conn.clone());
    let job_id = id_gen.generate();
    let now = Utc::now();
    let (job, _) = repo
        .create_with_translations(
            job::ActiveModel {
                id: Set(job_id.clone()),
                project_id: Set(project_id.to_string()),
                source_content_type: Set("page".to_string()),
                source_object_id: Set("42".to_string()),
                user_id: Set(None),
                name: Set(format!("test #{job_id}")),
                description: Set(String::new()),
                reference_number: Set(String::new()),
                due_date: Set(None),
                translation_job_uid: Set(String::new()),
                status: Set(JobStatus::Unsynced),
                first_synced_at: Set(None),
                last_synced_at: Set(None),
                file_uri: Set(String::new()),
                content_hash: Set(hash.to_string()),
                translations_imported_at: Set(None),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
            },
            vec![job_translation::ActiveModel {
                id: Set(id_gen.generate()),
                job_id: Set(job_id),
                translation_id: Set("t-fr".to_string()),
                locale: Set("fr".to_string()),
                imported_at: Set(None),
                created_at: Set(now.into()),
            }],
        )
        .await
        .unwrap();
    job
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_database_connection() {
    let config = TestDbConfig::default();
    let result = TestDatabase::with_config(config).await;
    assert!(result.is_ok(), "Failed to connect: {:?}", result.err());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_snapshot_replaces_target_locales() {
    let db = TestDatabase::new().await.expect("Failed to connect");
    db.reset().await.unwrap();
    let repo = ProjectRepository::new(db.conn.clone());

    let (first, locales) = repo.save_snapshot(snapshot(&["de-DE", "fr-FR"])).await.unwrap();
    assert_eq!(locales.len(), 2);

    let (second, locales) = repo.save_snapshot(snapshot(&["fr-FR", "ja-JP"])).await.unwrap();
    assert_eq!(first.id, second.id);

    let stored = repo.find_target_locales(&second.id).await.unwrap();
    let ids: Vec<_> = stored.iter().map(|l| l.locale_id.as_str()).collect();
    assert_eq!(ids, vec!["fr-FR", "ja-JP"]);
    assert_eq!(locales.len(), 2);
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_check_constraint_rejects_unsynced_with_uid() {
    let db = TestDatabase::new().await.expect("Failed to connect");
    db.reset().await.unwrap();
    let projects = ProjectRepository::new(db.conn.clone());
    let (project, _) = projects.save_snapshot(snapshot(&["fr-FR"])).await.unwrap();
    let job = create_job(&db, &project.id, "hash").await;

    let result = db
        .conn
        .execute(Statement::from_string(
            DatabaseBackend::Postgres,
            format!(
                "UPDATE job SET translation_job_uid = 'uid' WHERE id = '{}'",
                job.id
            ),
        ))
        .await;

    assert!(result.is_err());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_find_duplicate_respects_hash() {
    let db = TestDatabase::new().await.expect("Failed to connect");
    db.reset().await.unwrap();
    let projects = ProjectRepository::new(db.conn.clone());
    let (project, _) = projects.save_snapshot(snapshot(&["fr-FR"])).await.unwrap();
    let job = create_job(&db, &project.id, "hash-h").await;

    let repo = JobRepository::new(db.conn.clone());
    let same = repo.find_duplicate("page", "42", "hash-h").await.unwrap();
    assert_eq!(same.map(|j| j.id), Some(job.id));

    let changed = repo.find_duplicate("page", "42", "hash-h2").await.unwrap();
    assert!(changed.is_none());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_row_lock_serializes_transactions() {
    let db = TestDatabase::new().await.expect("Failed to connect");
    db.reset().await.unwrap();
    let projects = ProjectRepository::new(db.conn.clone());
    let (project, _) = projects.save_snapshot(snapshot(&["fr-FR"])).await.unwrap();
    let job = create_job(&db, &project.id, "hash").await;

    let repo = JobRepository::new(db.conn.clone());
    let holder = repo.begin().await.unwrap();
    repo.lock_by_id(&holder, &job.id).await.unwrap().unwrap();

    let contender_repo = repo.clone();
    let job_id = job.id.clone();
    let contender = tokio::spawn(async move {
        let txn = contender_repo.begin().await.unwrap();
        let locked = contender_repo.lock_by_id(&txn, &job_id).await.unwrap();
        txn.commit().await.unwrap();
        locked
    });

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!contender.is_finished());

    holder.commit().await.unwrap();
    let locked = contender.await.unwrap();
    assert!(locked.is_some());
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(!config.username.is_empty());
    assert!(!config.database.is_empty());
}
