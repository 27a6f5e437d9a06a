//! Explain command implementation

use super::{output, store_at};
use anyhow::Result;
use rwd_cohort_store::SqlExecutor;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for explain command
pub struct ExplainConfig {
    pub db: Option<PathBuf>,
    pub query: String,
    pub format: output::OutputFormat,
    pub output_file: Option<PathBuf>,
}

/// Print the query execution plan
pub fn run(config: ExplainConfig) -> Result<()> {
    let executor = SqlExecutor::new(Arc::new(store_at(config.db)));
    let plan = executor.explain(&config.query);

    output::print_serialized(&plan, &config.format, config.output_file.as_deref())?;

    if !plan.ok {
        std::process::exit(1);
    }
    Ok(())
}
