//! Search command implementation

use super::{output, store_at};
use anyhow::{Context, Result};
use rwd_cohort_search::ConceptSearcher;
use rwd_cohort_types::CodeSystem;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for search command
pub struct SearchConfig {
    pub db: Option<PathBuf>,
    pub term: String,
    pub system: Option<String>,
    pub format: output::OutputFormat,
    pub output_file: Option<PathBuf>,
    pub verbose: bool,
}

/// Search the reference vocabularies for a clinical concept
pub fn run(config: SearchConfig) -> Result<()> {
    let system = config
        .system
        .as_deref()
        .map(str::parse::<CodeSystem>)
        .transpose()?;

    let searcher = ConceptSearcher::new(Arc::new(store_at(config.db)));
    let matches = searcher
        .search(&config.term, system)
        .with_context(|| format!("Search for '{}' failed", config.term))?;

    if config.verbose {
        eprintln!("{} match(es) for '{}'", matches.len(), config.term);
    }

    output::print_serialized(&matches, &config.format, config.output_file.as_deref())
}
