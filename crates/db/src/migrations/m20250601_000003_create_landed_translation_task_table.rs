//! Create the landed translation review task table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LandedTranslationTask::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LandedTranslationTask::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LandedTranslationTask::ContentType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LandedTranslationTask::ObjectId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LandedTranslationTask::RelevantLocale)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LandedTranslationTask::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LandedTranslationTask::CompletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(LandedTranslationTask::CancelledAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_landed_translation_task_content")
                    .table(LandedTranslationTask::Table)
                    .col(LandedTranslationTask::ContentType)
                    .col(LandedTranslationTask::ObjectId)
                    .col(LandedTranslationTask::RelevantLocale)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LandedTranslationTask::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum LandedTranslationTask {
    Table,
    Id,
    ContentType,
    ObjectId,
    RelevantLocale,
    CreatedAt,
    CompletedAt,
    CancelledAt,
}
