//! ICD-10 concept hierarchy
//!
//! ICD-10 codes nest by prefix: E11 (type 2 diabetes) covers E11.9 (without
//! complications), E11.65 (with hyperglycemia), and so on. The hierarchy for
//! a code is derived with prefix matching against the reference table.

use rusqlite::params;
use rwd_cohort_store::{Store, StoreError};
use rwd_cohort_types::CodeSystem;
use serde::{Deserialize, Serialize};

/// A code with its description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeEntry {
    pub code: String,
    pub description: String,
}

/// Hierarchical relationships for a concept code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptHierarchy {
    pub code: String,
    pub code_system: CodeSystem,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<CodeEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub siblings: Vec<CodeEntry>,
    /// Set for code systems without hierarchy support
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Look up parent, children, and siblings for a code
///
/// Only ICD-10-CM has a derivable hierarchy; other systems report
/// "Hierarchy not supported".
pub fn concept_hierarchy(
    store: &Store,
    code: &str,
    code_system: CodeSystem,
) -> Result<ConceptHierarchy, StoreError> {
    if code_system != CodeSystem::Icd10Cm {
        return Ok(ConceptHierarchy {
            code: code.to_string(),
            code_system,
            parent: None,
            children: Vec::new(),
            siblings: Vec::new(),
            message: Some("Hierarchy not supported".to_string()),
        });
    }

    let conn = store.open()?;

    // Parent drops the last character; three-character codes are category
    // roots with no parent.
    let parent = if code.chars().count() > 3 {
        let mut chars = code.chars();
        chars.next_back();
        Some(chars.as_str().to_string())
    } else {
        None
    };

    let children = prefix_entries(&conn, code)?;
    let siblings = match &parent {
        Some(parent_code) => prefix_entries(&conn, parent_code)?,
        None => Vec::new(),
    };

    Ok(ConceptHierarchy {
        code: code.to_string(),
        code_system,
        parent,
        children,
        siblings,
        message: None,
    })
}

fn prefix_entries(conn: &rusqlite::Connection, prefix: &str) -> Result<Vec<CodeEntry>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT icd_10_code, description FROM ref_icd10 WHERE icd_10_code LIKE ?1",
    )?;
    let entries = stmt
        .query_map(params![format!("{prefix}%")], |row| {
            Ok(CodeEntry {
                code: row.get(0)?,
                description: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(entries)
}
