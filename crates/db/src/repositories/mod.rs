//! Database repositories.

#![allow(missing_docs)]

mod job;
mod landed_task;
mod project;

pub use job::JobRepository;
pub use landed_task::LandedTaskRepository;
pub use project::{ProjectRepository, ProjectSnapshot, TargetLocaleSnapshot};
