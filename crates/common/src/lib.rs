//! Common utilities and shared types for locsync.
//!
//! This crate provides foundational components used across all locsync crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//!
//! # Example
//!
//! ```no_run
//! use locsync_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     println!("{} -> {}", config.smartling.project_id, id_gen.generate());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;

pub use config::{
    CatalogConfig, Config, DatabaseConfig, LoggingConfig, QueueConfig, SchedulerConfig, SmartlingConfig,
    SmartlingEnvironment,
};
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
