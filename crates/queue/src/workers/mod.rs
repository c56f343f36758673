//! Job workers.

mod sync;

pub use sync::{SyncWorkerContext, sync_worker};
