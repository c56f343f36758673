//! Database entities.

#![allow(missing_docs)]

pub mod job;
pub mod job_translation;
pub mod landed_translation_task;
pub mod project;
pub mod project_target_locale;

pub use job::Entity as Job;
pub use job_translation::Entity as JobTranslation;
pub use landed_translation_task::Entity as LandedTranslationTask;
pub use project::Entity as Project;
pub use project_target_locale::Entity as ProjectTargetLocale;
