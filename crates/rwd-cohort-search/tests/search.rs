//! Concept search integration tests against a seeded store

use pretty_assertions::assert_eq;
use rstest::rstest;
use rusqlite::params;
use rwd_cohort_search::{concept_hierarchy, ConceptSearcher};
use rwd_cohort_store::{create_demo_database, Store};
use rwd_cohort_types::CodeSystem;
use std::sync::Arc;

fn seeded_store() -> Arc<Store> {
    let store = Store::memory().expect("memory store");
    create_demo_database(&store, 60).expect("seed");
    Arc::new(store)
}

#[test]
fn diabetes_search_hits_reference_diagnoses() {
    let store = seeded_store();
    let searcher = ConceptSearcher::new(store);
    let matches = searcher.search("diabetes", None).expect("search");

    let codes: Vec<&str> = matches.iter().map(|m| m.code.as_str()).collect();
    assert!(codes.contains(&"E11.9"));
    assert!(codes.contains(&"E11.65"));
    // Substring matches mid-description score 0.7.
    let e119 = matches.iter().find(|m| m.code == "E11.9").unwrap();
    assert_eq!(e119.match_score, 0.7);
    assert_eq!(e119.code_system, CodeSystem::Icd10Cm);
}

#[test]
fn claims_codes_already_in_reference_are_deduplicated() {
    let store = seeded_store();
    let searcher = ConceptSearcher::new(store);
    // Seeded claims carry E11.9, which the reference table already has.
    let matches = searcher.search("diabetes", None).expect("search");

    let e119_count = matches.iter().filter(|m| m.code == "E11.9").count();
    assert_eq!(e119_count, 1);
    assert!(matches.iter().all(|m| m.source.is_none()));
}

#[test]
fn claims_only_codes_are_added_with_low_score() {
    let store = seeded_store();
    {
        let conn = store.open().expect("open");
        conn.execute(
            "INSERT INTO claims (claim_id, patient_id, service_date,
                 primary_diagnosis_code, primary_diagnosis_desc)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                "C999901",
                "P0001",
                "2023-06-01",
                "E11.8",
                "Type 2 diabetes mellitus with unspecified complications",
            ],
        )
        .expect("insert");
    }

    let searcher = ConceptSearcher::new(store);
    let matches = searcher.search("diabetes", None).expect("search");
    let supplemental = matches
        .iter()
        .find(|m| m.code == "E11.8")
        .expect("claims-sourced match");
    assert_eq!(supplemental.match_score, 0.6);
    assert_eq!(supplemental.source.as_deref(), Some("claims_data"));

    // Lowest score sorts last.
    assert_eq!(matches.last().unwrap().code, "E11.8");
}

#[test]
fn drug_name_and_class_matching() {
    let store = seeded_store();
    let searcher = ConceptSearcher::new(store);

    // Name and class both contain "insulin".
    let insulin = searcher.search("insulin", None).expect("search");
    let top = &insulin[0];
    assert_eq!(top.code_system, CodeSystem::Ndc);
    assert_eq!(top.match_score, 1.0);
    assert_eq!(top.drug_name.as_deref(), Some("Insulin Glargine"));

    // Name-only match.
    let metformin = searcher.search("metformin", None).expect("search");
    let top = &metformin[0];
    assert_eq!(top.match_score, 0.9);
    assert_eq!(top.description, "Metformin (Biguanide)");

    // Class-only match.
    let biguanides = searcher.search("biguanide", None).expect("search");
    let by_class = biguanides
        .iter()
        .find(|m| m.drug_name.as_deref() == Some("Metformin"))
        .expect("class match");
    assert_eq!(by_class.match_score, 0.7);

    // "statin" sits in both Atorvastatin's name and its class.
    let statins = searcher.search("statin", None).expect("search");
    let atorvastatin = statins
        .iter()
        .find(|m| m.drug_name.as_deref() == Some("Atorvastatin"))
        .expect("statin match");
    assert_eq!(atorvastatin.match_score, 1.0);
}

#[test]
fn prefix_diagnosis_scores_higher_than_substring() {
    let store = seeded_store();
    let searcher = ConceptSearcher::new(store);
    let matches = searcher.search("heart", None).expect("search");
    let i509 = matches.iter().find(|m| m.code == "I50.9").expect("I50.9");
    assert_eq!(i509.match_score, 0.9);
}

#[test]
fn code_system_filter_restricts_vocabularies() {
    let store = seeded_store();
    let searcher = ConceptSearcher::new(store);
    let matches = searcher
        .search("a", Some(CodeSystem::Ndc))
        .expect("search");
    assert!(!matches.is_empty());
    assert!(matches.iter().all(|m| m.code_system == CodeSystem::Ndc));
}

#[rstest]
#[case::diagnosis("diabetes", CodeSystem::Icd10Cm, "E11.9")]
#[case::procedure("visit", CodeSystem::Cpt, "99213")]
#[case::drug("metformin", CodeSystem::Ndc, "50090-2875-01")]
fn each_vocabulary_resolves_its_own_terms(
    #[case] term: &str,
    #[case] system: CodeSystem,
    #[case] expected_code: &str,
) {
    let store = seeded_store();
    let searcher = ConceptSearcher::new(store);
    let matches = searcher.search(term, Some(system)).expect("search");
    assert!(matches.iter().any(|m| m.code == expected_code));
    assert!(matches.iter().all(|m| m.code_system == system));
}

#[test]
fn results_are_sorted_descending_by_score() {
    let store = seeded_store();
    let searcher = ConceptSearcher::new(store);
    let matches = searcher.search("e", None).expect("search");
    for pair in matches.windows(2) {
        assert!(pair[0].match_score >= pair[1].match_score);
    }
}

#[test]
fn no_match_returns_empty_not_error() {
    let store = seeded_store();
    let searcher = ConceptSearcher::new(store);
    let matches = searcher.search("xylophone", None).expect("search");
    assert!(matches.is_empty());
}

#[test]
fn hierarchy_for_dotted_code() {
    let store = seeded_store();
    let hierarchy = concept_hierarchy(&store, "E11.9", CodeSystem::Icd10Cm).expect("hierarchy");
    // Parent drops the final character, dot handling included.
    assert_eq!(hierarchy.parent.as_deref(), Some("E11."));
    assert_eq!(hierarchy.children.len(), 1);
    assert!(hierarchy.siblings.iter().any(|e| e.code == "E11.65"));
    assert!(hierarchy.message.is_none());
}

#[test]
fn hierarchy_for_category_root() {
    let store = seeded_store();
    let hierarchy = concept_hierarchy(&store, "I10", CodeSystem::Icd10Cm).expect("hierarchy");
    assert_eq!(hierarchy.parent, None);
    assert_eq!(hierarchy.children.len(), 1);
    assert!(hierarchy.siblings.is_empty());
}

#[test]
fn hierarchy_unsupported_for_cpt() {
    let store = seeded_store();
    let hierarchy = concept_hierarchy(&store, "99213", CodeSystem::Cpt).expect("hierarchy");
    assert_eq!(hierarchy.message.as_deref(), Some("Hierarchy not supported"));
    assert!(hierarchy.children.is_empty());
}
