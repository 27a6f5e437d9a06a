//! Clinical concept search
//!
//! Keyword search over the three reference vocabularies (ICD-10 diagnoses,
//! CPT procedures, NDC drugs) plus a bounded supplemental scan of live
//! diagnosis claims, producing scored [`ConceptMatch`](rwd_cohort_types::ConceptMatch)
//! candidates for concept resolution. Scores are deterministic tie-break
//! rules, not a ranking model.

pub mod hierarchy;
pub mod searcher;

pub use hierarchy::{concept_hierarchy, CodeEntry, ConceptHierarchy};
pub use searcher::ConceptSearcher;
