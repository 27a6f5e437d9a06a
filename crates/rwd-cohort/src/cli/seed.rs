//! Seed command implementation

use super::{output, store_at};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Configuration for seed command
pub struct SeedConfig {
    pub db: Option<PathBuf>,
    pub patients: usize,
    pub verbose: bool,
}

/// Create or refresh the demo claims database
pub fn run(config: SeedConfig) -> Result<()> {
    let store = store_at(config.db);

    if config.verbose {
        match store.path() {
            Some(path) => eprintln!("Seeding database at {}", path.display()),
            None => eprintln!("Seeding in-memory database"),
        }
    }

    let summary = rwd_cohort_store::create_demo_database(&store, config.patients)
        .context("Failed to seed demo database")?;

    println!(
        "{}",
        output::format_success(&format!(
            "Seeded {} patients, {} claims, {} reference codes",
            summary.patients, summary.claims, summary.reference_codes
        ))
    );
    Ok(())
}
