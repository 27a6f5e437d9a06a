//! SQLite claims store access
//!
//! This crate owns every touchpoint with the RWD claims database:
//!
//! - [`Store`]: scoped connection management (one connection per operation,
//!   released on all exit paths)
//! - [`Catalog`]: schema introspection plus the static domain mappings that
//!   downstream SQL builders rely on
//! - [`SqlExecutor`]: guarded read-only SQL execution with timing, row-count
//!   summarization, and preview truncation
//! - [`seed`]: demo schema and deterministic synthetic data
//!
//! The executor never returns `Err` across its boundary; every failure is a
//! structured [`ExecutionResult`](rwd_cohort_types::ExecutionResult) with
//! `ok = false`.

pub mod catalog;
pub mod error;
pub mod executor;
pub mod seed;
pub mod store;

pub use catalog::{Catalog, ColumnInfo, DomainMapping, Relationship, TableInfo};
pub use error::StoreError;
pub use executor::{PlanStep, QueryPlan, SqlExecutor, SqlValidation, DESTRUCTIVE_KEYWORDS};
pub use seed::{create_demo_database, SeedSummary, DEFAULT_PATIENT_COUNT};
pub use store::Store;
