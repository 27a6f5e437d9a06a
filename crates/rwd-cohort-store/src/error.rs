//! Store errors

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by store operations that do run across a boundary
/// (the guarded executor converts these into structured results instead)
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database file does not exist yet
    #[error("Database not found at {path}. Run 'cohort seed' first.")]
    DatabaseNotFound { path: PathBuf },

    /// Any SQLite driver error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Filesystem error while creating the database location
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Create a database-not-found error
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::DatabaseNotFound { path: path.into() }
    }
}
