//! Smartling REST API client for locsync.
//!
//! - [`SmartlingClient`]: token lifecycle, envelope decoding, one method per endpoint
//! - [`TranslationsArchive`]: the downloaded ZIP of translated files
//! - [`ClientError`]: transport, invalid-response, and failed-response errors
//!
//! Every JSON response is wrapped as `{"response": {"code", "data"?, "errors"?}}`.
//! A non-2xx status with a valid error envelope is a
//! [`ClientError::FailedResponse`] carrying the vendor code; anything that does
//! not match the expected shape is a [`ClientError::InvalidResponse`].

mod archive;
mod client;
mod envelope;
mod error;
mod token;
pub mod types;
mod urls;

pub use archive::{ArchiveFile, TranslationsArchive};
pub use client::SmartlingClient;
pub use error::{ApiErrorDetail, ClientError};
pub use types::{
    CallbackMethod, CreateJobParams, JobDetails, JobList, JobListItem, ProjectDetails,
    TargetLocale,
};
pub use urls::{job_dashboard_url, visual_context_filename};
