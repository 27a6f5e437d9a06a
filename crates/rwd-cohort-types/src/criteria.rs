//! Structured eligibility criteria
//!
//! A criteria document is produced by the upstream protocol-parsing layer and
//! consumed read-only by the funnel engine. Upstream emits a richer DSL
//! (temporal windows, value constraints, concept resolutions); only the fields
//! the deterministic core dispatches on are modeled here, and unknown fields
//! are ignored during deserialization.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Clinical domain of a criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    /// Patient demographics (age, gender, ...)
    Demographic,
    /// Diagnosis codes (ICD-10)
    Diagnosis,
    /// Procedure codes (CPT/HCPCS)
    Procedure,
    /// Drug exposure (NDC, drug name/class)
    Drug,
    /// Laboratory results
    Lab,
    /// Enrollment periods
    Enrollment,
    /// Other observations
    Observation,
}

impl Domain {
    /// Lower-case name as it appears in criteria documents
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Demographic => "demographic",
            Self::Diagnosis => "diagnosis",
            Self::Procedure => "procedure",
            Self::Drug => "drug",
            Self::Lab => "lab",
            Self::Enrollment => "enrollment",
            Self::Observation => "observation",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single inclusion or exclusion criterion
///
/// Immutable once produced by upstream parsing. `id` is the stable handle
/// used to enable or disable the criterion in what-if runs (e.g. "I01").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criterion {
    /// Unique criterion id (e.g. "I01", "E03")
    pub id: String,
    /// Clinical domain
    pub domain: Domain,
    /// Human-readable concept name (e.g. "type 2 diabetes")
    pub concept: String,
    /// Original protocol text
    #[serde(default)]
    pub description: String,
}

impl Criterion {
    /// Create a criterion with an empty description
    pub fn new(id: impl Into<String>, domain: Domain, concept: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            domain,
            concept: concept.into(),
            description: String::new(),
        }
    }

    /// Set the protocol text
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Display name for funnel steps: description, then concept, then "Unknown"
    pub fn display_name(&self) -> &str {
        if !self.description.is_empty() {
            &self.description
        } else if !self.concept.is_empty() {
            &self.concept
        } else {
            "Unknown"
        }
    }

    /// Lower-cased concept text used by keyword dispatch
    pub fn concept_lower(&self) -> String {
        self.concept.to_lowercase()
    }
}

/// Complete inclusion/exclusion criteria document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriteriaDocument {
    /// Inclusion criteria, in protocol order
    #[serde(default)]
    pub inclusion: Vec<Criterion>,
    /// Exclusion criteria, in protocol order
    #[serde(default)]
    pub exclusion: Vec<Criterion>,
}

impl CriteriaDocument {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of criteria
    pub fn len(&self) -> usize {
        self.inclusion.len() + self.exclusion.len()
    }

    /// True if the document has no criteria
    pub fn is_empty(&self) -> bool {
        self.inclusion.is_empty() && self.exclusion.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_domain_roundtrip() {
        let json = serde_json::to_string(&Domain::Demographic).unwrap();
        assert_eq!(json, "\"demographic\"");
        let back: Domain = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Domain::Demographic);
    }

    #[test]
    fn test_criterion_tolerates_unknown_fields() {
        // Upstream DSL carries more fields than the deterministic core uses.
        let json = r#"{
            "id": "I01",
            "description": "Adults aged 18-75 years",
            "domain": "demographic",
            "concept": "age",
            "value_constraint": {"operator": "between", "value": [18, 75]},
            "verifiability": "rwd",
            "needs_definition": false
        }"#;
        let c: Criterion = serde_json::from_str(json).unwrap();
        assert_eq!(c.id, "I01");
        assert_eq!(c.domain, Domain::Demographic);
        assert_eq!(c.display_name(), "Adults aged 18-75 years");
    }

    #[test]
    fn test_display_name_fallback() {
        let c = Criterion::new("E01", Domain::Diagnosis, "heart failure");
        assert_eq!(c.display_name(), "heart failure");

        let unnamed = Criterion {
            id: "E02".to_string(),
            domain: Domain::Lab,
            concept: String::new(),
            description: String::new(),
        };
        assert_eq!(unnamed.display_name(), "Unknown");
    }

    #[test]
    fn test_document_missing_sections_default_empty() {
        let doc: CriteriaDocument = serde_json::from_str(r#"{"inclusion": []}"#).unwrap();
        assert!(doc.is_empty());
    }
}
