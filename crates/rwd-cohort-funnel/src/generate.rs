//! Text-generation collaborator
//!
//! Criteria parsing, concept resolution, and cohort SQL generation are
//! delegated to an external text-generation service. That service is modeled
//! here as the [`SqlGenerator`] capability so the rest of the system can be
//! wired against a deterministic stub. The deterministic pieces on this side
//! of the boundary are the prompt assembly and the extraction of fenced SQL
//! and JSON payloads from generated text.

use regex::Regex;
use rwd_cohort_types::CriteriaDocument;
use thiserror::Error;

/// Errors from a generation backend
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The backend failed to produce a response
    #[error("Generation backend error: {0}")]
    Backend(String),
}

/// Text-generation capability: prompt in, text out
///
/// Implementations may call a real model service; [`CannedGenerator`] is the
/// deterministic stand-in used offline and in tests.
pub trait SqlGenerator {
    fn generate(&self, prompt: &str) -> Result<String, GenerateError>;
}

/// Deterministic generator returning a fixed response
pub struct CannedGenerator {
    response: String,
}

impl CannedGenerator {
    /// Generator that always returns `response`
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}

impl SqlGenerator for CannedGenerator {
    fn generate(&self, _prompt: &str) -> Result<String, GenerateError> {
        Ok(self.response.clone())
    }
}

/// Extract the contents of a ```sql fenced block, if present
pub fn extract_sql_block(text: &str) -> Option<String> {
    let fence = Regex::new(r"(?s)```sql\n(.*?)\n```").ok()?;
    fence
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|sql| sql.as_str().to_string())
}

/// Extract cohort SQL from a generated response
///
/// Fenced block first; otherwise a response that looks like bare CTE SQL
/// (contains both WITH and SELECT) is taken verbatim; otherwise the raw
/// response is returned for the caller to validate.
pub fn extract_cohort_sql(text: &str) -> String {
    if let Some(sql) = extract_sql_block(text) {
        return sql;
    }
    if text.contains("WITH") && text.contains("SELECT") {
        return text.trim().to_string();
    }
    text.to_string()
}

/// Extract the first top-level JSON object span from generated text
pub fn extract_json_object(text: &str) -> Option<String> {
    let object = Regex::new(r"(?s)\{.*\}").ok()?;
    object.find(text).map(|m| m.as_str().to_string())
}

/// Prompt asking the backend for cohort SQL with CTEs
///
/// Carries the known code mappings so generated SQL stays aligned with the
/// deterministic rule tables.
pub fn cohort_sql_prompt(criteria: &CriteriaDocument) -> String {
    let criteria_json = serde_json::to_string_pretty(criteria).unwrap_or_default();
    format!(
        "Generate SQL for this criteria.\n\
         \n\
         Criteria DSL:\n\
         {criteria_json}\n\
         \n\
         Code mappings:\n\
         - Type 2 Diabetes: primary_diagnosis_code LIKE 'E11%' OR secondary_diagnosis_code LIKE 'E11%' OR tertiary_diagnosis_code LIKE 'E11%'\n\
         - Metformin: drug_name LIKE '%Metformin%'\n\
         - Heart failure: primary_diagnosis_code LIKE 'I50%' OR secondary_diagnosis_code LIKE 'I50%' OR tertiary_diagnosis_code LIKE 'I50%'\n\
         - Cancer: primary_diagnosis_code LIKE 'C%' OR secondary_diagnosis_code LIKE 'C%' OR tertiary_diagnosis_code LIKE 'C%'\n\
         \n\
         Generate SQL with CTEs. Return ONLY the SQL in a code block."
    )
}

/// Ask the backend for cohort SQL and extract it from the response
pub fn generate_cohort_sql(
    generator: &dyn SqlGenerator,
    criteria: &CriteriaDocument,
) -> Result<String, GenerateError> {
    let response = generator.generate(&cohort_sql_prompt(criteria))?;
    Ok(extract_cohort_sql(&response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rwd_cohort_types::{Criterion, Domain};

    #[test]
    fn test_fenced_sql_extraction() {
        let text = "Here is the query:\n```sql\nSELECT 1\n```\nDone.";
        assert_eq!(extract_sql_block(text).as_deref(), Some("SELECT 1"));
        assert_eq!(extract_sql_block("no fence here"), None);
    }

    #[test]
    fn test_multiline_fenced_sql() {
        let text = "```sql\nWITH cohort AS (\n  SELECT patient_id FROM patients\n)\nSELECT COUNT(*) FROM cohort\n```";
        let sql = extract_sql_block(text).unwrap();
        assert!(sql.starts_with("WITH cohort"));
        assert!(sql.ends_with("FROM cohort"));
    }

    #[test]
    fn test_bare_cte_fallback() {
        let text = "  WITH c AS (SELECT 1) SELECT * FROM c  ";
        assert_eq!(extract_cohort_sql(text), "WITH c AS (SELECT 1) SELECT * FROM c");
    }

    #[test]
    fn test_raw_response_last_resort() {
        assert_eq!(extract_cohort_sql("no sql at all"), "no sql at all");
    }

    #[test]
    fn test_json_object_extraction() {
        let text = "Sure! {\"inclusion\": []} hope that helps";
        assert_eq!(
            extract_json_object(text).as_deref(),
            Some("{\"inclusion\": []}"),
        );
        assert_eq!(extract_json_object("nothing here"), None);
    }

    #[test]
    fn test_canned_generator_roundtrip() {
        let mut criteria = CriteriaDocument::new();
        criteria
            .inclusion
            .push(Criterion::new("I01", Domain::Demographic, "age"));

        let generator =
            CannedGenerator::new("```sql\nSELECT patient_id FROM patients WHERE age >= 18\n```");
        let sql = generate_cohort_sql(&generator, &criteria).unwrap();
        assert_eq!(sql, "SELECT patient_id FROM patients WHERE age >= 18");
    }

    #[test]
    fn test_prompt_carries_criteria_and_mappings() {
        let mut criteria = CriteriaDocument::new();
        criteria
            .inclusion
            .push(Criterion::new("I02", Domain::Diagnosis, "type 2 diabetes"));
        let prompt = cohort_sql_prompt(&criteria);
        assert!(prompt.contains("\"type 2 diabetes\""));
        assert!(prompt.contains("LIKE 'E11%'"));
    }
}
