//! Vocabulary search with deterministic scoring

use rusqlite::params;
use rwd_cohort_store::{Store, StoreError};
use rwd_cohort_types::{CodeSystem, ConceptMatch, MatchingLogic};
use std::sync::Arc;

/// Supplemental claims scan is bounded to this many rows
const CLAIMS_SCAN_LIMIT: usize = 10;

/// Case-insensitive substring search over the reference vocabularies
pub struct ConceptSearcher {
    store: Arc<Store>,
}

impl ConceptSearcher {
    /// Create a searcher over the given store
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Search for a clinical concept, optionally restricted to one vocabulary
    ///
    /// Results are sorted descending by score; ties keep the vocabulary
    /// enumeration order (diagnosis, procedure, drug, then claims-sourced).
    /// No match yields an empty vector, not an error.
    pub fn search(
        &self,
        term: &str,
        code_system: Option<CodeSystem>,
    ) -> Result<Vec<ConceptMatch>, StoreError> {
        let search_term = term.to_lowercase();
        let pattern = format!("%{search_term}%");
        let conn = self.store.open()?;
        let mut results: Vec<ConceptMatch> = Vec::new();

        if matches!(code_system, None | Some(CodeSystem::Icd10Cm)) {
            let mut stmt = conn.prepare(
                "SELECT icd_10_code, description FROM ref_icd10
                 WHERE LOWER(description) LIKE ?1 ORDER BY description",
            )?;
            let mut rows = stmt.query(params![pattern])?;
            while let Some(row) = rows.next()? {
                let code: String = row.get(0)?;
                let description: String = row.get(1)?;
                let score = diagnosis_score(&search_term, &description);
                results.push(ConceptMatch::new(
                    code,
                    description,
                    CodeSystem::Icd10Cm,
                    score,
                    MatchingLogic::WildcardSupported,
                ));
            }
        }

        if matches!(code_system, None | Some(CodeSystem::Cpt)) {
            let mut stmt = conn.prepare(
                "SELECT cpt_code, description FROM ref_cpt
                 WHERE LOWER(description) LIKE ?1 ORDER BY description",
            )?;
            let mut rows = stmt.query(params![pattern])?;
            while let Some(row) = rows.next()? {
                let code: String = row.get(0)?;
                let description: String = row.get(1)?;
                let score = procedure_score(&search_term, &description);
                results.push(ConceptMatch::new(
                    code,
                    description,
                    CodeSystem::Cpt,
                    score,
                    MatchingLogic::ExactOnly,
                ));
            }
        }

        if matches!(code_system, None | Some(CodeSystem::Ndc)) {
            let mut stmt = conn.prepare(
                "SELECT ndc_code, drug_name, drug_class FROM ref_ndc
                 WHERE LOWER(drug_name) LIKE ?1 OR LOWER(drug_class) LIKE ?1
                 ORDER BY drug_name",
            )?;
            let mut rows = stmt.query(params![pattern])?;
            while let Some(row) = rows.next()? {
                let code: String = row.get(0)?;
                let name: String = row.get(1)?;
                let class: String = row.get(2)?;
                let score = drug_score(&search_term, &name, &class);
                results.push(
                    ConceptMatch::new(
                        code,
                        format!("{name} ({class})"),
                        CodeSystem::Ndc,
                        score,
                        MatchingLogic::IngredientOrClass,
                    )
                    .with_drug(name, class),
                );
            }
        }

        // Live claims can carry diagnosis codes the reference table lacks;
        // scan a bounded sample and add codes not already found.
        if matches!(code_system, None | Some(CodeSystem::Icd10Cm)) {
            let mut stmt = conn.prepare(
                "SELECT DISTINCT primary_diagnosis_code, primary_diagnosis_desc FROM claims
                 WHERE LOWER(primary_diagnosis_desc) LIKE ?1
                   AND primary_diagnosis_code IS NOT NULL
                 LIMIT ?2",
            )?;
            let mut rows = stmt.query(params![pattern, CLAIMS_SCAN_LIMIT as i64])?;
            while let Some(row) = rows.next()? {
                let code: String = row.get(0)?;
                let description: String = row.get(1)?;
                if results.iter().any(|m| m.code == code) {
                    continue;
                }
                results.push(
                    ConceptMatch::new(
                        code,
                        description,
                        CodeSystem::Icd10Cm,
                        0.6,
                        MatchingLogic::WildcardSupported,
                    )
                    .from_claims(),
                );
            }
        }

        // Stable sort: ties retain vocabulary enumeration order.
        results.sort_by(|a, b| {
            b.match_score
                .partial_cmp(&a.match_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        log::debug!("concept search '{term}' -> {} matches", results.len());
        Ok(results)
    }
}

/// Diagnosis score: exact 1.0, prefix 0.9, substring 0.7
fn diagnosis_score(term: &str, description: &str) -> f64 {
    let lower = description.to_lowercase();
    if lower == term {
        1.0
    } else if lower.starts_with(term) {
        0.9
    } else {
        0.7
    }
}

/// Procedure score: substring 0.8, otherwise 0.6
///
/// The SQL filter already guarantees the substring, so the 0.6 branch never
/// fires; it is retained to match observed upstream behavior.
fn procedure_score(term: &str, description: &str) -> f64 {
    if description.to_lowercase().contains(term) {
        0.8
    } else {
        0.6
    }
}

/// Drug score: name+class 1.0, name only 0.9, class only 0.7
fn drug_score(term: &str, name: &str, class: &str) -> f64 {
    let name_match = name.to_lowercase().contains(term);
    let class_match = class.to_lowercase().contains(term);
    if name_match && class_match {
        1.0
    } else if name_match {
        0.9
    } else {
        0.7
    }
}
