//! Shared data model for the RWD cohort funnel engine
//!
//! This crate defines the types exchanged between the store, search, and
//! funnel crates:
//! - Structured eligibility criteria (`Criterion`, `CriteriaDocument`)
//! - SQL execution results (`ExecutionResult`, `ExecutionMode`, `ErrorKind`)
//! - Funnel output (`FunnelStep`, `FunnelResult`)
//! - Concept search output (`ConceptMatch`, `CodeSystem`)
//!
//! All types serialize to the JSON wire shapes consumed by the upstream
//! orchestration layer, so field spellings here are load-bearing.

pub mod concept;
pub mod criteria;
pub mod execution;
pub mod funnel;

pub use concept::{CodeSystem, ConceptMatch, MatchingLogic, UnknownCodeSystem};
pub use criteria::{CriteriaDocument, Criterion, Domain};
pub use execution::{
    ErrorKind, ExecutionMode, ExecutionResult, ExecutionSummary, InvalidMode, Row,
};
pub use funnel::{FunnelResult, FunnelStep, StepType, SummaryStep};
