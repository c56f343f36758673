//! Background sync scheduling for locsync.
//!
//! - **Scheduler**: periodic tick over every job that still needs syncing
//! - **Dispatch**: run a sync in process or hand it to the Redis queue
//! - **Jobs / Workers**: the apalis task and the worker that consumes it

pub mod dispatch;
pub mod jobs;
pub mod scheduler;
pub mod workers;

pub use dispatch::{DispatchError, InlineDispatcher, RedisDispatcher, SyncDispatcher};
pub use jobs::*;
pub use scheduler::{SyncScheduler, TickReport};
pub use workers::*;
