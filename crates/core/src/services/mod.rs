//! Business logic services.

#![allow(missing_docs)]

pub mod callbacks;
pub mod catalog;
pub mod events;
pub mod landed_task;
pub mod project_cache;
pub mod submission;
pub mod sync;
pub mod vendor;

#[cfg(test)]
pub(crate) mod testing;

pub use callbacks::{
    JobDescriber, JobDescriberService, VisualContext, VisualContextProvider, VisualContextService,
};
pub use catalog::{Catalog, ContentCatalog, SourceDescription, TranslationTarget};
pub use events::{
    FanOutEventHandler, LandedTaskRecorder, NoOpEventHandler, SyncEventHandler,
    SyncEventHandlerService,
};
pub use landed_task::LandedTaskService;
pub use project_cache::{CurrentProject, ProjectCache};
pub use submission::{
    Submission, SubmissionService, SubmitJobInput, TranslationTargetInput, default_job_description,
    default_job_name,
};
pub use sync::{SyncReport, SyncService, dashboard_url, upload_file_uri};
pub use vendor::{Vendor, VendorApi};
