//! Translation job entity.

use sea_orm::ActiveValue;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a translation job.
///
/// `Unsynced` is local only; every other value mirrors the vendor's job status.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    /// Not yet created on the vendor side.
    #[sea_orm(string_value = "UNSYNCED")]
    Unsynced,
    #[sea_orm(string_value = "DRAFT")]
    Draft,
    #[sea_orm(string_value = "AWAITING_AUTHORIZATION")]
    AwaitingAuthorization,
    #[sea_orm(string_value = "IN_PROGRESS")]
    InProgress,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
    #[sea_orm(string_value = "CLOSED")]
    Closed,
    #[sea_orm(string_value = "DELETED")]
    Deleted,
}

impl JobStatus {
    /// Still being worked on by the vendor.
    pub const PENDING: [Self; 3] = [Self::Draft, Self::AwaitingAuthorization, Self::InProgress];
    /// Terminal with translations available.
    pub const TRANSLATED: [Self; 2] = [Self::Completed, Self::Closed];
    /// Terminal without translations.
    pub const UNTRANSLATED: [Self; 2] = [Self::Cancelled, Self::Deleted];
    /// No further sync needed.
    pub const FINAL: [Self; 2] = [Self::Closed, Self::Deleted];

    #[must_use]
    pub fn is_pending(self) -> bool {
        Self::PENDING.contains(&self)
    }

    #[must_use]
    pub fn is_translated(self) -> bool {
        Self::TRANSLATED.contains(&self)
    }

    #[must_use]
    pub fn is_untranslated(self) -> bool {
        Self::UNTRANSLATED.contains(&self)
    }

    #[must_use]
    pub fn is_final(self) -> bool {
        Self::FINAL.contains(&self)
    }

    /// Parse a vendor job status code. `UNSYNCED` is not a vendor status.
    #[must_use]
    pub fn from_vendor(code: &str) -> Option<Self> {
        match code {
            "DRAFT" => Some(Self::Draft),
            "AWAITING_AUTHORIZATION" => Some(Self::AwaitingAuthorization),
            "IN_PROGRESS" => Some(Self::InProgress),
            "COMPLETED" => Some(Self::Completed),
            "CANCELLED" => Some(Self::Cancelled),
            "CLOSED" => Some(Self::Closed),
            "DELETED" => Some(Self::Deleted),
            _ => None,
        }
    }
}

/// A translation job: one source snapshot into one or more target locales.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "job")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub project_id: String,

    /// CMS content type of the source (e.g. `wagtailcore.page`).
    pub source_content_type: String,

    /// CMS object identifier of the source.
    pub source_object_id: String,

    /// Requesting user, if known.
    #[sea_orm(nullable)]
    pub user_id: Option<String>,

    pub name: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    pub reference_number: String,

    #[sea_orm(nullable)]
    pub due_date: Option<DateTimeWithTimeZone>,

    /// Vendor job UID; empty until the first sync.
    pub translation_job_uid: String,

    pub status: JobStatus,

    #[sea_orm(nullable)]
    pub first_synced_at: Option<DateTimeWithTimeZone>,

    #[sea_orm(nullable)]
    pub last_synced_at: Option<DateTimeWithTimeZone>,

    /// URI of the uploaded source file; empty until uploaded.
    pub file_uri: String,

    /// SHA-256 of the exported source strings.
    pub content_hash: String,

    #[sea_orm(nullable)]
    pub translations_imported_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    /// Check the status/sync-state invariant for this row.
    pub fn check_sync_state(&self) -> Result<(), String> {
        check_sync_state(
            self.status,
            self.first_synced_at.is_some(),
            self.last_synced_at.is_some(),
            &self.translation_job_uid,
        )
    }
}

/// `UNSYNCED` iff both sync timestamps are null and the vendor UID is empty.
pub fn check_sync_state(
    status: JobStatus,
    has_first_synced_at: bool,
    has_last_synced_at: bool,
    translation_job_uid: &str,
) -> Result<(), String> {
    let never_synced =
        !has_first_synced_at && !has_last_synced_at && translation_job_uid.is_empty();
    let fully_synced = has_first_synced_at && has_last_synced_at && !translation_job_uid.is_empty();

    match status {
        JobStatus::Unsynced if never_synced => Ok(()),
        JobStatus::Unsynced => Err(
            "UNSYNCED job must not have sync timestamps or a vendor job UID".to_string(),
        ),
        _ if fully_synced => Ok(()),
        other => Err(format!(
            "{other:?} job must have both sync timestamps and a vendor job UID"
        )),
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::project::Entity",
        from = "Column::ProjectId",
        to = "super::project::Column::Id",
        on_delete = "Cascade"
    )]
    Project,
    #[sea_orm(has_many = "super::job_translation::Entity")]
    Translation,
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl Related<super::job_translation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Translation.def()
    }
}

fn current<V: Into<Value>>(value: &ActiveValue<V>) -> Option<&V> {
    match value {
        ActiveValue::Set(v) | ActiveValue::Unchanged(v) => Some(v),
        ActiveValue::NotSet => None,
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, _insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        // Partial updates are left to the table constraint.
        if let (Some(status), Some(first), Some(last), Some(uid)) = (
            current(&self.status),
            current(&self.first_synced_at),
            current(&self.last_synced_at),
            current(&self.translation_job_uid),
        ) {
            check_sync_state(*status, first.is_some(), last.is_some(), uid)
                .map_err(DbErr::Custom)?;
        }
        Ok(self)
    }
}
