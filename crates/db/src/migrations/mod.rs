//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250601_000001_create_project_tables;
mod m20250601_000002_create_job_tables;
mod m20250601_000003_create_landed_translation_task_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_project_tables::Migration),
            Box::new(m20250601_000002_create_job_tables::Migration),
            Box::new(m20250601_000003_create_landed_translation_task_table::Migration),
        ]
    }
}
