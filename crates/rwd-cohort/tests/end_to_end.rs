//! End-to-end tests over the public crate surface
//!
//! Seeds the demo database into a temporary file and drives the same path a
//! caller takes: introspect the schema, search concepts, execute guarded
//! SQL, and compute funnels from a wire-shaped criteria document.
//!
//! Seed arithmetic for 100 patients: ages cycle 12..=81 so 82 land in 18-75;
//! every third patient carries an E11% claim (34), every fifth a Metformin
//! claim (20), every tenth an I50% claim (10), every twenty-fifth a C% claim
//! (4).

use pretty_assertions::assert_eq;
use rwd_cohort::store::create_demo_database;
use rwd_cohort::types::{CodeSystem, CriteriaDocument, ErrorKind, ExecutionMode};
use rwd_cohort::{Catalog, ConceptSearcher, FunnelEngine, SqlExecutor, Store};
use std::sync::Arc;

fn seeded_store() -> (tempfile::TempDir, Arc<Store>) {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = Store::at(dir.path().join("claims.db"));
    create_demo_database(&store, 100).expect("seed");
    (dir, Arc::new(store))
}

fn wire_criteria() -> CriteriaDocument {
    serde_json::from_str(
        r#"{
            "inclusion": [
                {"id": "I01", "domain": "demographic", "concept": "age",
                 "description": "Adults aged 18-75 years"},
                {"id": "I02", "domain": "diagnosis", "concept": "type 2 diabetes",
                 "description": "Diagnosis of T2DM"},
                {"id": "I03", "domain": "drug", "concept": "metformin",
                 "description": "On metformin therapy"}
            ],
            "exclusion": [
                {"id": "E01", "domain": "diagnosis", "concept": "heart failure",
                 "description": "History of heart failure"},
                {"id": "E02", "domain": "diagnosis", "concept": "cancer",
                 "description": "Active malignancy"}
            ]
        }"#,
    )
    .expect("criteria document")
}

#[test]
fn catalog_reports_seeded_tables() {
    let (_dir, store) = seeded_store();
    let catalog = Catalog::introspect(&store).expect("introspect");

    let names = catalog.table_names();
    for table in ["patients", "claims", "ref_icd10", "ref_cpt", "ref_ndc"] {
        assert!(names.contains(&table), "missing table {table}");
    }

    let patients = catalog
        .tables
        .iter()
        .find(|t| t.name == "patients")
        .expect("patients table");
    assert_eq!(patients.row_count, 100);
    assert!(patients.columns.iter().any(|c| c.name == "age"));
}

#[test]
fn search_finds_metformin_in_drug_vocabulary() {
    let (_dir, store) = seeded_store();
    let searcher = ConceptSearcher::new(store);

    let matches = searcher.search("metformin", None).expect("search");
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].code_system, CodeSystem::Ndc);
    assert_eq!(matches[0].drug_name.as_deref(), Some("Metformin"));
    // Name-only match scores 0.9.
    assert_eq!(matches[0].match_score, 0.9);

    let none = searcher
        .search("metformin", Some(CodeSystem::Cpt))
        .expect("search");
    assert!(none.is_empty());
}

#[test]
fn guarded_executor_rejects_quoted_keyword() {
    let (_dir, store) = seeded_store();
    let executor = SqlExecutor::new(store);

    // Lexical guard false-positive: the keyword sits inside a string literal.
    let result = executor.run(
        "SELECT * FROM patients WHERE gender = 'UPDATE'",
        ExecutionMode::Preview,
    );
    assert!(!result.ok);
    assert_eq!(result.error_type, Some(ErrorKind::SafetyViolation));
}

#[test]
fn full_funnel_over_seeded_population() {
    let (_dir, store) = seeded_store();
    let engine = FunnelEngine::new(Arc::new(SqlExecutor::new(store)));
    let criteria = wire_criteria();

    let include: Vec<String> = criteria.inclusion.iter().map(|c| c.id.clone()).collect();
    let exclude: Vec<String> = criteria.exclusion.iter().map(|c| c.id.clone()).collect();
    let result = engine.what_if(&criteria, &include, &exclude);

    assert_eq!(result.base_count, 100);
    assert_eq!(result.steps.len(), 5);

    let counts: Vec<i64> = result.steps.iter().map(|s| s.count).collect();
    assert_eq!(counts, vec![82, 34, 20, 10, 6]);
    assert_eq!(result.final_count, 6);
    assert!(result.is_monotonic());

    // Percentages stay pinned to the base population, not the running count.
    assert_eq!(result.steps[0].percentage, 82.0);
    assert_eq!(result.steps[2].percentage, 20.0);
    assert_eq!(result.steps[3].name, "Exclude: History of heart failure");
    assert_eq!(result.steps[3].drop_count, 10);
}

#[test]
fn funnel_subset_of_enabled_ids() {
    let (_dir, store) = seeded_store();
    let engine = FunnelEngine::new(Arc::new(SqlExecutor::new(store)));
    let criteria = wire_criteria();

    let result = engine.what_if(&criteria, &["I01".to_string()], &["E02".to_string()]);
    assert_eq!(result.steps.len(), 2);
    assert_eq!(result.steps[0].id, "I01");
    assert_eq!(result.steps[1].id, "E02");
    assert_eq!(result.final_count, 82 - 4);
}

#[test]
fn generated_sql_executes_and_summarizes() {
    use rwd_cohort::funnel::{generate_cohort_sql, CannedGenerator};

    let (_dir, store) = seeded_store();
    let executor = Arc::new(SqlExecutor::new(store));
    let criteria = wire_criteria();

    let generator = CannedGenerator::new(
        "Here is the cohort query:\n\
         ```sql\n\
         WITH diabetics AS (\n\
             SELECT DISTINCT patient_id FROM claims\n\
             WHERE primary_diagnosis_code LIKE 'E11%'\n\
         )\n\
         SELECT p.patient_id FROM patients p\n\
         JOIN diabetics d ON d.patient_id = p.patient_id\n\
         WHERE p.age BETWEEN 18 AND 75\n\
         ```\n",
    );
    let sql = generate_cohort_sql(&generator, &criteria).expect("generate");
    assert!(sql.starts_with("WITH diabetics"));

    let result = executor.run(&sql, ExecutionMode::Full);
    assert!(result.ok, "generated SQL failed: {:?}", result.error);
    assert_eq!(result.row_count(), result.preview_rows.len());

    let engine = FunnelEngine::new(Arc::clone(&executor));
    let summary = engine.attrition_summary(&criteria, &result);
    assert_eq!(summary.first().map(|s| s.step.as_str()), Some("Base Population"));
    assert_eq!(summary.last().map(|s| s.step.as_str()), Some("Final Cohort"));
    assert_eq!(summary.last().map(|s| s.count), Some(result.row_count() as i64));
}
