//! Guarded executor integration tests
//!
//! Exercises the safety guard, output modes, truncation warnings, and error
//! classification against a real in-memory database.

use pretty_assertions::assert_eq;
use rstest::rstest;
use rwd_cohort_store::{create_demo_database, SqlExecutor, Store};
use rwd_cohort_types::{ErrorKind, ExecutionMode};
use std::sync::Arc;

fn seeded_executor(patients: usize) -> SqlExecutor {
    let store = Store::memory().expect("memory store");
    create_demo_database(&store, patients).expect("seed");
    SqlExecutor::new(Arc::new(store))
}

#[rstest]
#[case("DROP TABLE patients", "DROP")]
#[case("DELETE FROM claims", "DELETE")]
#[case("TRUNCATE TABLE patients", "TRUNCATE")]
#[case("UPDATE patients SET age = 0", "UPDATE")]
#[case("INSERT INTO patients VALUES (1)", "INSERT")]
#[case("ALTER TABLE patients ADD COLUMN x", "ALTER")]
fn destructive_statements_are_rejected(#[case] sql: &str, #[case] keyword: &str) {
    let executor = seeded_executor(10);
    let result = executor.run(sql, ExecutionMode::Count);
    assert!(!result.ok);
    assert_eq!(result.error_type, Some(ErrorKind::SafetyViolation));
    assert_eq!(
        result.error.as_deref(),
        Some(format!("Destructive operation '{keyword}' not allowed").as_str()),
    );
}

#[test]
fn keyword_inside_string_literal_still_rejects() {
    // The guard is textual, not a parser; this documented false-positive is
    // part of the compatibility contract.
    let executor = seeded_executor(10);
    let result = executor.run(
        "SELECT * FROM patients WHERE gender = 'UPDATE'",
        ExecutionMode::Count,
    );
    assert!(!result.ok);
    assert_eq!(result.error_type, Some(ErrorKind::SafetyViolation));
}

#[test]
fn lowercase_destructive_keyword_is_caught() {
    let executor = seeded_executor(10);
    let result = executor.run("drop table patients", ExecutionMode::Count);
    assert_eq!(result.error_type, Some(ErrorKind::SafetyViolation));
}

#[test]
fn count_mode_returns_no_rows() {
    let executor = seeded_executor(25);
    let result = executor.run("SELECT * FROM patients", ExecutionMode::Count);
    assert!(result.ok);
    assert_eq!(result.row_count(), 25);
    assert!(result.preview_rows.is_empty());
    assert!(result.warnings.is_empty());
}

#[test]
fn preview_mode_caps_at_ten_rows_with_warning() {
    let executor = seeded_executor(25);
    let result = executor.run("SELECT * FROM patients", ExecutionMode::Preview);
    assert!(result.ok);
    assert_eq!(result.row_count(), 25);
    assert_eq!(result.preview_rows.len(), 10);
    assert_eq!(result.warnings, vec!["Showing 10 of 25 rows".to_string()]);
}

#[test]
fn preview_mode_small_result_has_no_warning() {
    let executor = seeded_executor(5);
    let result = executor.run("SELECT * FROM patients", ExecutionMode::Preview);
    assert!(result.ok);
    assert_eq!(result.preview_rows.len(), 5);
    assert!(result.warnings.is_empty());
}

#[test]
fn full_mode_returns_every_row() {
    let executor = seeded_executor(25);
    let result = executor.run("SELECT * FROM patients", ExecutionMode::Full);
    assert!(result.ok);
    assert_eq!(result.preview_rows.len(), result.row_count());
    assert!(result.warnings.is_empty());
}

#[test]
fn full_mode_warns_on_large_result_sets() {
    let executor = seeded_executor(1100);
    let result = executor.run("SELECT * FROM patients", ExecutionMode::Full);
    assert!(result.ok);
    assert_eq!(result.row_count(), 1100);
    assert_eq!(
        result.warnings,
        vec!["Large result set: 1100 rows returned".to_string()],
    );
}

#[test]
fn rows_preserve_select_column_order() {
    let executor = seeded_executor(3);
    let result = executor.run(
        "SELECT gender, age, patient_id FROM patients LIMIT 1",
        ExecutionMode::Preview,
    );
    assert!(result.ok);
    let columns: Vec<&String> = result.preview_rows[0].keys().collect();
    assert_eq!(columns, ["gender", "age", "patient_id"]);
}

#[test]
fn syntax_errors_are_classified() {
    let executor = seeded_executor(5);
    let result = executor.run("SELECT * FORM patients", ExecutionMode::Count);
    assert!(!result.ok);
    assert_eq!(result.error_type, Some(ErrorKind::SyntaxError));
}

#[test]
fn missing_table_is_a_schema_error() {
    let executor = seeded_executor(5);
    let result = executor.run("SELECT * FROM nonexistent_table", ExecutionMode::Count);
    assert!(!result.ok);
    assert_eq!(result.error_type, Some(ErrorKind::SchemaError));
}

#[test]
fn missing_column_is_a_schema_error() {
    let executor = seeded_executor(5);
    let result = executor.run(
        "SELECT shoe_size FROM patients",
        ExecutionMode::Count,
    );
    assert!(!result.ok);
    assert_eq!(result.error_type, Some(ErrorKind::SchemaError));
}

#[test]
fn missing_database_file_is_unknown_error() {
    let store = Store::at("/nonexistent/dir/rwd_claims.db");
    let executor = SqlExecutor::new(Arc::new(store));
    let result = executor.run("SELECT 1", ExecutionMode::Count);
    assert!(!result.ok);
    assert_eq!(result.error_type, Some(ErrorKind::UnknownError));
}

#[rstest]
#[case("count")]
#[case("preview")]
#[case("full")]
fn run_str_accepts_all_modes(#[case] mode: &str) {
    let executor = seeded_executor(5);
    let result = executor.run_str("SELECT * FROM patients", mode);
    assert!(result.ok, "mode {mode} failed: {:?}", result.error);
}

#[test]
fn run_str_rejects_unknown_mode() {
    let executor = seeded_executor(5);
    let result = executor.run_str("SELECT * FROM patients", "sideways");
    assert!(!result.ok);
    assert_eq!(result.error_type, Some(ErrorKind::InvalidMode));
    assert_eq!(
        result.error.as_deref(),
        Some("Invalid mode 'sideways'. Use 'count', 'preview', or 'full'"),
    );
}

#[test]
fn explain_returns_plan_steps() {
    let executor = seeded_executor(5);
    let plan = executor.explain("SELECT * FROM patients WHERE age > 40");
    assert!(plan.ok);
    assert!(!plan.query_plan.is_empty());
}

#[test]
fn validate_flags_bad_syntax() {
    let executor = seeded_executor(5);
    assert!(executor.validate("SELECT * FROM patients").valid);
    assert!(!executor.validate("SELECT * FORM patients").valid);
}

#[test]
fn file_backed_store_roundtrip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("claims.db");
    let store = Store::at(&path);
    create_demo_database(&store, 12).expect("seed");

    let executor = SqlExecutor::new(Arc::new(Store::at(&path)));
    let result = executor.run("SELECT COUNT(*) AS cnt FROM patients", ExecutionMode::Preview);
    assert!(result.ok);
    assert_eq!(result.scalar_i64("cnt"), Some(12));
}
