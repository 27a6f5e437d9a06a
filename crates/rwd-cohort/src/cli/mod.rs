//! CLI functionality for the cohort tool
//!
//! This module contains all CLI-related functionality including:
//! - Database seeding
//! - Schema catalog output
//! - Concept search
//! - Guarded SQL execution and query plans
//! - What-if funnel computation
//! - Cohort SQL generation from a canned backend response
//! - Output formatting

#[cfg(feature = "cli")]
pub mod catalog;
#[cfg(feature = "cli")]
pub mod explain;
#[cfg(feature = "cli")]
pub mod funnel;
#[cfg(feature = "cli")]
pub mod generate;
#[cfg(feature = "cli")]
pub mod output;
#[cfg(feature = "cli")]
pub mod search;
#[cfg(feature = "cli")]
pub mod seed;
#[cfg(feature = "cli")]
pub mod sql;

#[cfg(feature = "cli")]
use rwd_cohort_store::Store;
#[cfg(feature = "cli")]
use std::path::PathBuf;

/// Store for the given `--db` override, falling back to `DATABASE_PATH`
#[cfg(feature = "cli")]
pub fn store_at(db: Option<PathBuf>) -> Store {
    match db {
        Some(path) => Store::at(path),
        None => Store::from_env(),
    }
}
