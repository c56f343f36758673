//! Core synchronization logic for locsync.
//!
//! The sync engine in [`services::sync`] drives one translation job at a time
//! against the vendor, holding a row lock for the whole transaction. Around it
//! sit the pure helpers (locale formatting, content hashing, the PO codec) and
//! the services the host CMS calls into (submission, project cache, landed
//! tasks).

pub mod content_hash;
pub mod error;
pub mod locale;
pub mod po;
pub mod services;

pub use error::SyncError;
pub use locale::LocaleFormatter;
pub use services::*;
