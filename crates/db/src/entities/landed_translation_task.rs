//! Review reminder for an imported translation.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A review task created when a translation lands in the CMS.
///
/// Open while both `completed_at` and `cancelled_at` are null.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "landed_translation_task")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub content_type: String,

    pub object_id: String,

    /// CMS locale code of the landed translation.
    pub relevant_locale: String,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub completed_at: Option<DateTimeWithTimeZone>,

    #[sea_orm(nullable)]
    pub cancelled_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.completed_at.is_none() && self.cancelled_at.is_none()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
