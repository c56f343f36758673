//! Create the translation job tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Job::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Job::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Job::ProjectId).string().not_null())
                    .col(ColumnDef::new(Job::SourceContentType).string().not_null())
                    .col(ColumnDef::new(Job::SourceObjectId).string().not_null())
                    .col(ColumnDef::new(Job::UserId).string().null())
                    .col(ColumnDef::new(Job::Name).string_len(170).not_null())
                    .col(ColumnDef::new(Job::Description).text().not_null())
                    .col(
                        ColumnDef::new(Job::ReferenceNumber)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Job::DueDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Job::TranslationJobUid)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Job::Status)
                            .string_len(32)
                            .not_null()
                            .default("UNSYNCED"),
                    )
                    .col(
                        ColumnDef::new(Job::FirstSyncedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Job::LastSyncedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Job::FileUri).string().not_null().default(""))
                    .col(
                        ColumnDef::new(Job::ContentHash)
                            .string_len(64)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Job::TranslationsImportedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Job::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Job::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Job::Table, Job::ProjectId)
                            .to(Project::Table, Project::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Ties "has talked to the vendor" to the sync timestamps and UID.
        manager
            .get_connection()
            .execute_unprepared(
                r"
                ALTER TABLE job ADD CONSTRAINT job_status_sync_state_check CHECK (
                    (status = 'UNSYNCED'
                        AND first_synced_at IS NULL
                        AND last_synced_at IS NULL
                        AND translation_job_uid = '')
                    OR (status <> 'UNSYNCED'
                        AND first_synced_at IS NOT NULL
                        AND last_synced_at IS NOT NULL
                        AND translation_job_uid <> '')
                );
                ",
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_job_source_hash_status")
                    .table(Job::Table)
                    .col(Job::SourceContentType)
                    .col(Job::SourceObjectId)
                    .col(Job::ContentHash)
                    .col(Job::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_job_status")
                    .table(Job::Table)
                    .col(Job::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(JobTranslation::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(JobTranslation::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(JobTranslation::JobId).string().not_null())
                    .col(
                        ColumnDef::new(JobTranslation::TranslationId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(JobTranslation::Locale).string().not_null())
                    .col(
                        ColumnDef::new(JobTranslation::ImportedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(JobTranslation::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(JobTranslation::Table, JobTranslation::JobId)
                            .to(Job::Table, Job::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_job_translation_job_translation")
                    .table(JobTranslation::Table)
                    .col(JobTranslation::JobId)
                    .col(JobTranslation::TranslationId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(JobTranslation::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Job::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Job {
    Table,
    Id,
    ProjectId,
    SourceContentType,
    SourceObjectId,
    UserId,
    Name,
    Description,
    ReferenceNumber,
    DueDate,
    TranslationJobUid,
    Status,
    FirstSyncedAt,
    LastSyncedAt,
    FileUri,
    ContentHash,
    TranslationsImportedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum JobTranslation {
    Table,
    Id,
    JobId,
    TranslationId,
    Locale,
    ImportedAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Project {
    Table,
    Id,
}
