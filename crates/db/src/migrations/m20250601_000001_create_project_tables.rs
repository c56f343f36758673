//! Create the vendor project tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Project::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Project::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Project::Environment).string().not_null())
                    .col(ColumnDef::new(Project::AccountUid).string().not_null())
                    .col(ColumnDef::new(Project::ProjectUid).string().not_null())
                    .col(
                        ColumnDef::new(Project::Archived)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Project::Name).string().not_null())
                    .col(ColumnDef::new(Project::TypeCode).string().not_null())
                    .col(ColumnDef::new(Project::SourceLocaleId).string().not_null())
                    .col(
                        ColumnDef::new(Project::SourceLocaleDescription)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Project::FirstSyncedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Project::LastSyncedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_project_environment_account_project")
                    .table(Project::Table)
                    .col(Project::Environment)
                    .col(Project::AccountUid)
                    .col(Project::ProjectUid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProjectTargetLocale::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProjectTargetLocale::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ProjectTargetLocale::ProjectId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProjectTargetLocale::LocaleId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProjectTargetLocale::Description)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProjectTargetLocale::Enabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ProjectTargetLocale::Table, ProjectTargetLocale::ProjectId)
                            .to(Project::Table, Project::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_project_target_locale_project_locale")
                    .table(ProjectTargetLocale::Table)
                    .col(ProjectTargetLocale::ProjectId)
                    .col(ProjectTargetLocale::LocaleId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProjectTargetLocale::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Project::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Project {
    Table,
    Id,
    Environment,
    AccountUid,
    ProjectUid,
    Archived,
    Name,
    TypeCode,
    SourceLocaleId,
    SourceLocaleDescription,
    FirstSyncedAt,
    LastSyncedAt,
}

#[derive(DeriveIden)]
enum ProjectTargetLocale {
    Table,
    Id,
    ProjectId,
    LocaleId,
    Description,
    Enabled,
}
