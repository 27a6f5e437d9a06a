//! Concept search output types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Coded vocabulary a match came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CodeSystem {
    /// ICD-10-CM diagnosis codes
    #[serde(rename = "ICD10CM", alias = "ICD10")]
    Icd10Cm,
    /// CPT procedure codes
    #[serde(rename = "CPT")]
    Cpt,
    /// NDC drug codes
    #[serde(rename = "NDC")]
    Ndc,
}

impl CodeSystem {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Icd10Cm => "ICD10CM",
            Self::Cpt => "CPT",
            Self::Ndc => "NDC",
        }
    }
}

impl fmt::Display for CodeSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognized code system name
#[derive(Debug, Clone, Error)]
#[error("Unknown code system '{0}'. Use 'ICD10CM', 'CPT', or 'NDC'")]
pub struct UnknownCodeSystem(pub String);

impl FromStr for CodeSystem {
    type Err = UnknownCodeSystem;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // "ICD10" is accepted as a legacy spelling of ICD10CM.
        match s {
            "ICD10CM" | "ICD10" => Ok(Self::Icd10Cm),
            "CPT" => Ok(Self::Cpt),
            "NDC" => Ok(Self::Ndc),
            other => Err(UnknownCodeSystem(other.to_string())),
        }
    }
}

/// How codes from this match are intended to be applied in SQL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchingLogic {
    /// Prefix/wildcard matching is meaningful (ICD-10 hierarchies)
    WildcardSupported,
    /// Codes match exactly (CPT)
    ExactOnly,
    /// Match by drug ingredient or class (NDC)
    IngredientOrClass,
}

/// One scored candidate code for a clinical concept
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptMatch {
    /// The medical code
    pub code: String,
    /// Full description (for drugs: "name (class)")
    pub description: String,
    /// Vocabulary the code belongs to
    pub code_system: CodeSystem,
    /// Deterministic relevance score in [0, 1]; 1.0 = exact match
    pub match_score: f64,
    /// How the code should be matched downstream
    pub matching_logic: MatchingLogic,
    /// Drug name (NDC matches only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drug_name: Option<String>,
    /// Drug class (NDC matches only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drug_class: Option<String>,
    /// Set to "claims_data" for supplemental matches found in live claims
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl ConceptMatch {
    /// A reference-vocabulary match
    pub fn new(
        code: impl Into<String>,
        description: impl Into<String>,
        code_system: CodeSystem,
        match_score: f64,
        matching_logic: MatchingLogic,
    ) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
            code_system,
            match_score,
            matching_logic,
            drug_name: None,
            drug_class: None,
            source: None,
        }
    }

    /// Attach NDC drug detail
    pub fn with_drug(mut self, name: impl Into<String>, class: impl Into<String>) -> Self {
        self.drug_name = Some(name.into());
        self.drug_class = Some(class.into());
        self
    }

    /// Mark as sourced from live claims rather than a reference table
    pub fn from_claims(mut self) -> Self {
        self.source = Some("claims_data".to_string());
        self
    }
}
