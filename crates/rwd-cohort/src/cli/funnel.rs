//! Funnel command implementation

use super::{output, store_at};
use anyhow::{Context, Result};
use rwd_cohort_funnel::FunnelEngine;
use rwd_cohort_store::SqlExecutor;
use rwd_cohort_types::CriteriaDocument;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Configuration for funnel command
pub struct FunnelConfig {
    pub db: Option<PathBuf>,
    pub criteria: PathBuf,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub format: output::OutputFormat,
    pub output_file: Option<PathBuf>,
    pub verbose: bool,
}

/// Compute the what-if attrition funnel for a criteria document
///
/// With no `--include`/`--exclude` flags every criterion in the document is
/// enabled; passing either flag switches to the explicitly listed ids.
pub fn run(config: FunnelConfig) -> Result<()> {
    let document = load_criteria(&config.criteria)?;

    let (include, exclude) = if config.include.is_empty() && config.exclude.is_empty() {
        (
            document.inclusion.iter().map(|c| c.id.clone()).collect(),
            document.exclusion.iter().map(|c| c.id.clone()).collect(),
        )
    } else {
        (config.include, config.exclude)
    };

    if config.verbose {
        eprintln!(
            "Computing funnel over {} criteria ({} inclusion enabled, {} exclusion enabled)",
            document.len(),
            include.len(),
            exclude.len()
        );
    }

    let engine = FunnelEngine::new(Arc::new(SqlExecutor::new(Arc::new(store_at(config.db)))));
    let result = engine.what_if(&document, &include, &exclude);

    output::print_serialized(&result, &config.format, config.output_file.as_deref())
}

/// Read and parse a criteria document
pub fn load_criteria(path: &Path) -> Result<CriteriaDocument> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read criteria file: {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Invalid criteria document: {}", path.display()))
}
