//! Patient attrition funnel engine
//!
//! This crate turns structured eligibility criteria into executable count
//! queries and derives the attrition funnel:
//!
//! - [`rules`]: ordered predicate/template rule tables mapping criteria to
//!   SQL, first match wins, with an explicit default
//! - [`CriterionCompiler`]: inclusion and exclusion compilation over those
//!   tables
//! - [`FunnelEngine`]: sequential what-if funnel computation against a
//!   guarded executor
//! - [`generate`]: the abstract text-generation collaborator used by the
//!   upstream resolution layer, with a deterministic stub for offline use
//!
//! The engine deliberately degrades instead of failing: a base-population
//! query error falls back to a fixed default, and a criterion whose count
//! query fails contributes no step rather than aborting the funnel.

pub mod compiler;
pub mod engine;
pub mod generate;
pub mod rules;

pub use compiler::CriterionCompiler;
pub use engine::{FunnelEngine, DEFAULT_BASE_POPULATION};
pub use generate::{
    cohort_sql_prompt, extract_cohort_sql, extract_json_object, extract_sql_block,
    generate_cohort_sql, CannedGenerator, GenerateError, SqlGenerator,
};
pub use rules::{RuleContext, RuleTable, SqlRule};
