//! Pattern-driven student ID allocation, validation and migration.

pub mod config;
pub mod error;
pub mod generator;
pub mod migration;
pub mod pattern;

pub use config::{CaseFormat, StudentIdConfig, YearFormat};
pub use error::StudentIdError;
pub use generator::{GeneratedId, IdComponents, IdValidation, StudentIdGenerator};
pub use migration::{
    MigrationEntry, MigrationPlan, generate_migration_plan, generate_migration_plan_with_existing,
};
