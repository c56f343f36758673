//! Vendor project entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A vendor project as last observed.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "project")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// API environment the project was fetched from.
    pub environment: String,

    /// Vendor account identifier.
    pub account_uid: String,

    /// Vendor project identifier.
    pub project_uid: String,

    pub archived: bool,

    pub name: String,

    /// Vendor project type code (e.g. `APPLICATION_RESOURCES`).
    pub type_code: String,

    pub source_locale_id: String,

    pub source_locale_description: String,

    pub first_synced_at: DateTimeWithTimeZone,

    pub last_synced_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::project_target_locale::Entity")]
    TargetLocale,
    #[sea_orm(has_many = "super::job::Entity")]
    Job,
}

impl Related<super::project_target_locale::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TargetLocale.def()
    }
}

impl Related<super::job::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Job.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
