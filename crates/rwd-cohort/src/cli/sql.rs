//! Sql command implementation

use super::{output, store_at};
use anyhow::Result;
use rwd_cohort_store::SqlExecutor;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for sql command
pub struct SqlConfig {
    pub db: Option<PathBuf>,
    pub query: String,
    pub mode: String,
    pub format: output::OutputFormat,
    pub output_file: Option<PathBuf>,
}

/// Execute a read-only query through the guarded executor
///
/// The executor never fails at the call boundary; failures come back inside
/// the printed result with `ok = false`, and the process exit code reflects
/// them.
pub fn run(config: SqlConfig) -> Result<()> {
    let executor = SqlExecutor::new(Arc::new(store_at(config.db)));
    let result = executor.run_str(&config.query, &config.mode);

    for warning in &result.warnings {
        eprintln!("{}", output::format_warning(warning));
    }

    output::print_serialized(&result, &config.format, config.output_file.as_deref())?;

    if !result.ok {
        std::process::exit(1);
    }
    Ok(())
}
