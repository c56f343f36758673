//! Job definitions.

mod sync;

pub use sync::SyncJobTask;
