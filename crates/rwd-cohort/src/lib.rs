//! Real-world-data cohort funnel engine
//!
//! This crate ties together the pieces that turn structured clinical-trial
//! eligibility criteria into patient attrition funnels over a claims
//! database:
//! - Shared data model (criteria, execution results, funnel steps)
//! - Scoped SQLite access with schema introspection and a guarded executor
//! - Concept search over the reference vocabularies
//! - Criterion-to-SQL rule tables and the funnel engine
//!
//! # Example
//!
//! ```ignore
//! use rwd_cohort::{FunnelEngine, SqlExecutor, Store};
//! use std::sync::Arc;
//!
//! let store = Arc::new(Store::from_env());
//! let engine = FunnelEngine::new(Arc::new(SqlExecutor::new(store)));
//! let result = engine.what_if(&criteria, &enabled_inclusion, &enabled_exclusion);
//! ```

// Re-export all public APIs from internal crates
pub use rwd_cohort_funnel as funnel;
pub use rwd_cohort_search as search;
pub use rwd_cohort_store as store;
pub use rwd_cohort_types as types;

// Convenience re-exports
pub use rwd_cohort_funnel::{CriterionCompiler, FunnelEngine};
pub use rwd_cohort_search::ConceptSearcher;
pub use rwd_cohort_store::{Catalog, SqlExecutor, Store};
pub use rwd_cohort_types::{CriteriaDocument, Criterion, ExecutionResult, FunnelResult};

// CLI module (only available with cli feature)
#[cfg(feature = "cli")]
pub mod cli;
