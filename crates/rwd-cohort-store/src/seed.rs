//! Demo schema and synthetic data
//!
//! Builds the claims database the rest of the system queries: `patients`,
//! `claims`, and the three reference vocabularies, with the same performance
//! indexes the production load job creates. Seeded rows are deterministic so
//! funnel numbers are reproducible across runs.

use crate::error::StoreError;
use crate::store::Store;
use chrono::{Days, NaiveDate};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

/// Default synthetic population size
pub const DEFAULT_PATIENT_COUNT: usize = 500;

/// Row counts produced by a seed run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedSummary {
    pub patients: usize,
    pub claims: usize,
    pub reference_codes: usize,
}

/// Drop and recreate all tables, seed synthetic data, and build indexes
pub fn create_demo_database(
    store: &Store,
    patient_count: usize,
) -> Result<SeedSummary, StoreError> {
    let mut conn = store.open_or_create()?;
    install_schema(&conn)?;

    let tx = conn.transaction()?;
    let reference_codes = seed_reference_tables(&tx)?;
    let (patients, claims) = seed_population(&tx, patient_count)?;
    tx.commit()?;

    create_indexes(&conn)?;
    log::debug!("seeded demo database: {patients} patients, {claims} claims");

    Ok(SeedSummary {
        patients,
        claims,
        reference_codes,
    })
}

/// Create all tables, dropping any existing ones first
pub fn install_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "DROP TABLE IF EXISTS claims;
         DROP TABLE IF EXISTS patients;
         DROP TABLE IF EXISTS ref_icd10;
         DROP TABLE IF EXISTS ref_cpt;
         DROP TABLE IF EXISTS ref_ndc;

         CREATE TABLE patients (
             patient_id TEXT PRIMARY KEY,
             age INTEGER NOT NULL,
             gender TEXT NOT NULL,
             race TEXT,
             ethnicity TEXT,
             state TEXT,
             date_of_birth TEXT,
             enrollment_start_date TEXT,
             enrollment_end_date TEXT
         );

         CREATE TABLE claims (
             claim_id TEXT PRIMARY KEY,
             patient_id TEXT NOT NULL,
             service_date TEXT,
             primary_diagnosis_code TEXT,
             primary_diagnosis_desc TEXT,
             secondary_diagnosis_code TEXT,
             secondary_diagnosis_desc TEXT,
             tertiary_diagnosis_code TEXT,
             tertiary_diagnosis_desc TEXT,
             cpt_code TEXT,
             cpt_description TEXT,
             hcpcs_code TEXT,
             hcpcs_description TEXT,
             ndc_code TEXT,
             drug_name TEXT,
             drug_class TEXT,
             days_supply INTEGER,
             quantity_dispensed REAL
         );

         CREATE TABLE ref_icd10 (
             icd_10_code TEXT PRIMARY KEY,
             description TEXT NOT NULL
         );

         CREATE TABLE ref_cpt (
             cpt_code TEXT PRIMARY KEY,
             description TEXT NOT NULL
         );

         CREATE TABLE ref_ndc (
             ndc_code TEXT PRIMARY KEY,
             drug_name TEXT NOT NULL,
             drug_class TEXT NOT NULL
         );",
    )?;
    Ok(())
}

/// Create the performance indexes used by cohort queries
pub fn create_indexes(conn: &Connection) -> Result<(), StoreError> {
    let indexes = [
        ("idx_claims_patient", "claims", "patient_id"),
        ("idx_claims_service_date", "claims", "service_date"),
        ("idx_claims_primary_dx", "claims", "primary_diagnosis_code"),
        ("idx_claims_secondary_dx", "claims", "secondary_diagnosis_code"),
        ("idx_claims_ndc", "claims", "ndc_code"),
        ("idx_claims_cpt", "claims", "cpt_code"),
        ("idx_patients_id", "patients", "patient_id"),
        ("idx_patients_age", "patients", "age"),
        ("idx_patients_enrollment_start", "patients", "enrollment_start_date"),
    ];
    for (index, table, column) in indexes {
        conn.execute(
            &format!("CREATE INDEX IF NOT EXISTS {index} ON {table}({column})"),
            [],
        )?;
    }
    Ok(())
}

const ICD10_CODES: [(&str, &str); 7] = [
    ("E11.9", "Type 2 diabetes mellitus without complications"),
    ("E11.65", "Type 2 diabetes mellitus with hyperglycemia"),
    ("I50.9", "Heart failure, unspecified"),
    ("I10", "Essential (primary) hypertension"),
    ("C50.911", "Malignant neoplasm of unspecified site of right female breast"),
    ("J45.909", "Unspecified asthma, uncomplicated"),
    ("N18.3", "Chronic kidney disease, stage 3"),
];

const CPT_CODES: [(&str, &str); 4] = [
    ("99213", "Office or other outpatient visit, established patient"),
    ("99214", "Office or other outpatient visit, established patient, moderate complexity"),
    ("80053", "Comprehensive metabolic panel"),
    ("83036", "Hemoglobin A1c measurement"),
];

const NDC_CODES: [(&str, &str, &str); 4] = [
    ("50090-2875-01", "Metformin", "Biguanide"),
    ("00071-0155-23", "Lisinopril", "ACE Inhibitor"),
    ("00093-7424-56", "Atorvastatin", "Statin"),
    ("00088-2220-33", "Insulin Glargine", "Insulin"),
];

fn seed_reference_tables(conn: &Connection) -> Result<usize, StoreError> {
    for (code, description) in ICD10_CODES {
        conn.execute(
            "INSERT INTO ref_icd10 (icd_10_code, description) VALUES (?1, ?2)",
            params![code, description],
        )?;
    }
    for (code, description) in CPT_CODES {
        conn.execute(
            "INSERT INTO ref_cpt (cpt_code, description) VALUES (?1, ?2)",
            params![code, description],
        )?;
    }
    for (code, name, class) in NDC_CODES {
        conn.execute(
            "INSERT INTO ref_ndc (ndc_code, drug_name, drug_class) VALUES (?1, ?2, ?3)",
            params![code, name, class],
        )?;
    }
    Ok(ICD10_CODES.len() + CPT_CODES.len() + NDC_CODES.len())
}

fn seed_population(conn: &Connection, patient_count: usize) -> Result<(usize, usize), StoreError> {
    let base_date = NaiveDate::from_ymd_opt(2023, 1, 1).expect("valid seed base date");
    let genders = ["F", "M"];
    let races = ["White", "Black", "Asian", "Other"];
    let ethnicities = ["Not Hispanic", "Hispanic"];
    let states = ["CA", "TX", "NY", "FL", "IL"];

    let mut claim_seq = 0usize;
    for i in 0..patient_count {
        // Ages cycle 12..=81 so the 18-75 demographic filter has patients on
        // both sides of each bound.
        let age = 12 + (i % 70) as i64;
        let patient_id = format!("P{:04}", i + 1);
        let birth_year = 2023 - age;
        let enrollment_start = base_date
            .checked_sub_days(Days::new((i % 90) as u64))
            .unwrap_or(base_date);

        conn.execute(
            "INSERT INTO patients (patient_id, age, gender, race, ethnicity, state,
                 date_of_birth, enrollment_start_date, enrollment_end_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                patient_id,
                age,
                genders[i % genders.len()],
                races[i % races.len()],
                ethnicities[i % ethnicities.len()],
                states[i % states.len()],
                format!("{birth_year}-06-15"),
                enrollment_start.format("%Y-%m-%d").to_string(),
                "2024-12-31",
            ],
        )?;

        let service_date = base_date
            .checked_add_days(Days::new((i % 365) as u64))
            .unwrap_or(base_date)
            .format("%Y-%m-%d")
            .to_string();

        // Everyone has at least one office visit.
        insert_visit_claim(conn, &mut claim_seq, &patient_id, &service_date)?;

        if i % 3 == 0 {
            insert_diagnosis_claim(
                conn,
                &mut claim_seq,
                &patient_id,
                &service_date,
                "E11.9",
                "Type 2 diabetes mellitus without complications",
            )?;
        }
        if i % 5 == 0 {
            insert_pharmacy_claim(conn, &mut claim_seq, &patient_id, &service_date)?;
        }
        if i % 10 == 0 {
            insert_diagnosis_claim(
                conn,
                &mut claim_seq,
                &patient_id,
                &service_date,
                "I50.9",
                "Heart failure, unspecified",
            )?;
        }
        if i % 25 == 0 {
            insert_diagnosis_claim(
                conn,
                &mut claim_seq,
                &patient_id,
                &service_date,
                "C50.911",
                "Malignant neoplasm of unspecified site of right female breast",
            )?;
        }
    }

    Ok((patient_count, claim_seq))
}

fn insert_visit_claim(
    conn: &Connection,
    claim_seq: &mut usize,
    patient_id: &str,
    service_date: &str,
) -> Result<(), StoreError> {
    *claim_seq += 1;
    conn.execute(
        "INSERT INTO claims (claim_id, patient_id, service_date,
             primary_diagnosis_code, primary_diagnosis_desc, cpt_code, cpt_description)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            format!("C{claim_seq:06}"),
            patient_id,
            service_date,
            "I10",
            "Essential (primary) hypertension",
            "99213",
            "Office or other outpatient visit, established patient",
        ],
    )?;
    Ok(())
}

fn insert_diagnosis_claim(
    conn: &Connection,
    claim_seq: &mut usize,
    patient_id: &str,
    service_date: &str,
    code: &str,
    description: &str,
) -> Result<(), StoreError> {
    *claim_seq += 1;
    conn.execute(
        "INSERT INTO claims (claim_id, patient_id, service_date,
             primary_diagnosis_code, primary_diagnosis_desc)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            format!("C{claim_seq:06}"),
            patient_id,
            service_date,
            code,
            description,
        ],
    )?;
    Ok(())
}

fn insert_pharmacy_claim(
    conn: &Connection,
    claim_seq: &mut usize,
    patient_id: &str,
    service_date: &str,
) -> Result<(), StoreError> {
    *claim_seq += 1;
    conn.execute(
        "INSERT INTO claims (claim_id, patient_id, service_date,
             ndc_code, drug_name, drug_class, days_supply, quantity_dispensed)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            format!("C{claim_seq:06}"),
            patient_id,
            service_date,
            "50090-2875-01",
            "Metformin",
            "Biguanide",
            30,
            60.0,
        ],
    )?;
    Ok(())
}
