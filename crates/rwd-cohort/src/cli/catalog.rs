//! Catalog command implementation

use super::{output, store_at};
use anyhow::{Context, Result};
use rwd_cohort_store::Catalog;
use std::path::PathBuf;

/// Configuration for catalog command
pub struct CatalogConfig {
    pub db: Option<PathBuf>,
    pub format: output::OutputFormat,
    pub output_file: Option<PathBuf>,
}

/// Introspect the database schema and print the catalog
pub fn run(config: CatalogConfig) -> Result<()> {
    let store = store_at(config.db);
    let catalog = Catalog::introspect(&store).context("Failed to introspect database schema")?;
    output::print_serialized(&catalog, &config.format, config.output_file.as_deref())
}
