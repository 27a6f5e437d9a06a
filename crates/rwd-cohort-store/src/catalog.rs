//! Schema catalog introspection
//!
//! Returns the complete database shape consumed by downstream SQL builders:
//! tables with columns and row counts, plus the static domain mappings that
//! say where diagnoses, drugs, procedures, demographics, and enrollment live.

use crate::error::StoreError;
use crate::store::Store;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A column of an introspected table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
    pub nullable: bool,
    pub primary_key: bool,
}

/// An introspected table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    pub name: String,
    pub row_count: i64,
    pub columns: Vec<ColumnInfo>,
    pub description: String,
}

/// Where one clinical domain's data lives
///
/// The original catalog shapes these maps differently per domain, so most
/// fields are optional; absent fields are omitted from JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainMapping {
    pub table: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_columns: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc_columns: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supply_column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity_column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_table: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_code_col: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_desc_col: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_name_col: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_class_col: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_column: Option<String>,
}

/// A relationship between tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub relationship_type: String,
    pub description: String,
}

/// Complete schema catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub tables: Vec<TableInfo>,
    pub domain_mappings: IndexMap<String, DomainMapping>,
    pub relationships: Vec<Relationship>,
    pub sample_queries: IndexMap<String, String>,
    pub notes: Vec<String>,
}

impl Catalog {
    /// Introspect the store and assemble the catalog
    pub fn introspect(store: &Store) -> Result<Self, StoreError> {
        let conn = store.open()?;

        let mut stmt =
            conn.prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")?;
        let table_names: Vec<String> = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<_, _>>()?;
        drop(stmt);

        let mut tables = Vec::with_capacity(table_names.len());
        for name in &table_names {
            let mut info_stmt = conn.prepare(&format!("PRAGMA table_info({name})"))?;
            let columns: Vec<ColumnInfo> = info_stmt
                .query_map([], |row| {
                    Ok(ColumnInfo {
                        name: row.get::<_, String>(1)?,
                        column_type: row.get::<_, String>(2)?,
                        nullable: row.get::<_, i64>(3)? == 0,
                        primary_key: row.get::<_, i64>(5)? != 0,
                    })
                })?
                .collect::<Result<_, _>>()?;
            drop(info_stmt);

            let row_count: i64 =
                conn.query_row(&format!("SELECT COUNT(*) FROM {name}"), [], |row| {
                    row.get(0)
                })?;

            tables.push(TableInfo {
                name: name.clone(),
                row_count,
                columns,
                description: table_description(name).to_string(),
            });
        }

        Ok(Self {
            tables,
            domain_mappings: standard_domain_mappings(),
            relationships: standard_relationships(),
            sample_queries: standard_sample_queries(),
            notes: catalog_notes(),
        })
    }

    /// Table names in the catalog, in introspection order
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }
}

fn table_description(name: &str) -> &'static str {
    match name {
        "claims" => "Main claims table containing diagnoses, procedures, drugs, and services",
        "patients" => "Patient demographics and enrollment periods",
        "ref_icd10" => "ICD-10 diagnosis code reference",
        "ref_cpt" => "CPT procedure code reference",
        "ref_ndc" => "NDC drug code reference",
        _ => "",
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Static map from clinical domain to where its data lives
pub fn standard_domain_mappings() -> IndexMap<String, DomainMapping> {
    let mut mappings = IndexMap::new();
    mappings.insert(
        "diagnosis".to_string(),
        DomainMapping {
            table: "claims".to_string(),
            code_columns: Some(strings(&[
                "primary_diagnosis_code",
                "secondary_diagnosis_code",
                "tertiary_diagnosis_code",
            ])),
            desc_columns: Some(strings(&[
                "primary_diagnosis_desc",
                "secondary_diagnosis_desc",
                "tertiary_diagnosis_desc",
            ])),
            date_column: Some("service_date".to_string()),
            reference_table: Some("ref_icd10".to_string()),
            reference_code_col: Some("icd_10_code".to_string()),
            reference_desc_col: Some("description".to_string()),
            ..Default::default()
        },
    );
    mappings.insert(
        "procedure".to_string(),
        DomainMapping {
            table: "claims".to_string(),
            code_columns: Some(strings(&["cpt_code", "hcpcs_code"])),
            desc_columns: Some(strings(&["cpt_description", "hcpcs_description"])),
            date_column: Some("service_date".to_string()),
            reference_table: Some("ref_cpt".to_string()),
            reference_code_col: Some("cpt_code".to_string()),
            reference_desc_col: Some("description".to_string()),
            ..Default::default()
        },
    );
    mappings.insert(
        "drug".to_string(),
        DomainMapping {
            table: "claims".to_string(),
            code_columns: Some(strings(&["ndc_code"])),
            desc_columns: Some(strings(&["drug_name"])),
            class_column: Some("drug_class".to_string()),
            date_column: Some("service_date".to_string()),
            supply_column: Some("days_supply".to_string()),
            quantity_column: Some("quantity_dispensed".to_string()),
            reference_table: Some("ref_ndc".to_string()),
            reference_code_col: Some("ndc_code".to_string()),
            reference_name_col: Some("drug_name".to_string()),
            reference_class_col: Some("drug_class".to_string()),
            ..Default::default()
        },
    );
    mappings.insert(
        "demographic".to_string(),
        DomainMapping {
            table: "patients".to_string(),
            columns: Some(strings(&[
                "age",
                "gender",
                "race",
                "ethnicity",
                "state",
                "date_of_birth",
            ])),
            ..Default::default()
        },
    );
    mappings.insert(
        "enrollment".to_string(),
        DomainMapping {
            table: "patients".to_string(),
            start_column: Some("enrollment_start_date".to_string()),
            end_column: Some("enrollment_end_date".to_string()),
            ..Default::default()
        },
    );
    mappings
}

fn standard_relationships() -> Vec<Relationship> {
    vec![Relationship {
        from: "claims.patient_id".to_string(),
        to: "patients.patient_id".to_string(),
        relationship_type: "many-to-one".to_string(),
        description: "Claims belong to patients".to_string(),
    }]
}

/// Worked queries downstream SQL builders can pattern-match against
pub fn standard_sample_queries() -> IndexMap<String, String> {
    let mut queries = IndexMap::new();
    queries.insert(
        "get_patients_with_diagnosis".to_string(),
        "SELECT DISTINCT c.patient_id FROM claims c \
         WHERE c.primary_diagnosis_code LIKE 'E11%'"
            .to_string(),
    );
    queries.insert(
        "get_patients_on_drug".to_string(),
        "SELECT DISTINCT c.patient_id FROM claims c \
         WHERE c.drug_name LIKE '%Metformin%'"
            .to_string(),
    );
    queries.insert(
        "get_patients_by_age".to_string(),
        "SELECT patient_id FROM patients WHERE age BETWEEN 18 AND 75".to_string(),
    );
    queries
}

fn catalog_notes() -> Vec<String> {
    strings(&[
        "All date columns are stored as TEXT in ISO format (YYYY-MM-DD)",
        "Use LIKE with % for ICD-10 wildcard matching (e.g., 'E11%' for all T2DM codes)",
        "Multiple diagnosis columns exist: primary, secondary, tertiary",
        "Claims table contains all clinical events (diagnoses, procedures, drugs)",
        "Always join claims to patients on patient_id",
    ])
}
