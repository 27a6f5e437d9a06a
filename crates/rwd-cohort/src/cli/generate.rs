//! Generate command implementation

use super::{funnel::load_criteria, output, store_at};
use anyhow::{Context, Result};
use rwd_cohort_funnel::{generate_cohort_sql, CannedGenerator, FunnelEngine};
use rwd_cohort_store::SqlExecutor;
use rwd_cohort_types::ExecutionMode;
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for generate command
pub struct GenerateConfig {
    pub db: Option<PathBuf>,
    pub criteria: PathBuf,
    pub canned: PathBuf,
    pub execute: bool,
    pub format: output::OutputFormat,
    pub output_file: Option<PathBuf>,
    pub verbose: bool,
}

/// Extract cohort SQL from a canned backend response, optionally execute it
///
/// The canned file stands in for a model-backed generation service; the
/// extraction and everything downstream of it is the same either way.
pub fn run(config: GenerateConfig) -> Result<()> {
    let document = load_criteria(&config.criteria)?;
    let response = fs::read_to_string(&config.canned)
        .with_context(|| format!("Failed to read canned response: {}", config.canned.display()))?;

    let generator = CannedGenerator::new(response);
    let sql = generate_cohort_sql(&generator, &document)?;

    if config.verbose {
        eprintln!("Extracted {} bytes of SQL", sql.len());
    }

    if !config.execute {
        return output::write_output(&sql, config.output_file.as_deref());
    }

    let executor = Arc::new(SqlExecutor::new(Arc::new(store_at(config.db))));
    let result = executor.run(&sql, ExecutionMode::Full);
    for warning in &result.warnings {
        eprintln!("{}", output::format_warning(warning));
    }

    let engine = FunnelEngine::new(Arc::clone(&executor));
    let attrition = engine.attrition_summary(&document, &result);

    let report = json!({
        "sql": sql,
        "execution": &result,
        "attrition": attrition,
    });
    output::print_serialized(&report, &config.format, config.output_file.as_deref())?;

    if !result.ok {
        std::process::exit(1);
    }
    Ok(())
}
