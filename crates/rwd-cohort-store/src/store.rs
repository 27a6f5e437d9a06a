//! Scoped database connection management
//!
//! Every operation against the store opens its own connection and drops it on
//! all exit paths; no connection outlives the call that acquired it. This is
//! the only resource-lifetime contract in the system. Each connection carries
//! an execution bound (progress-handler interrupt) so a pathological query
//! cannot block the calling thread indefinitely.

use crate::error::StoreError;
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Environment variable naming the database file
pub const DATABASE_PATH_VAR: &str = "DATABASE_PATH";

/// Default database location relative to the working directory
pub const DEFAULT_DATABASE_PATH: &str = "data/rwd_claims.db";

/// Default per-connection execution bound
const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Progress-handler callback granularity in VM instructions
const PROGRESS_OPS: i32 = 1000;

static MEMORY_STORE_SEQ: AtomicUsize = AtomicUsize::new(0);

enum StoreKind {
    /// On-disk database file
    File(PathBuf),
    /// Shared-cache in-memory database. The anchor connection keeps the
    /// database alive between scoped opens.
    Memory {
        uri: String,
        _anchor: Connection,
    },
}

/// Source of scoped database connections
pub struct Store {
    kind: StoreKind,
    query_timeout: Duration,
}

impl Store {
    /// Store backed by the file at `path`
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: StoreKind::File(path.into()),
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    /// Store located via `DATABASE_PATH`, defaulting to `data/rwd_claims.db`
    pub fn from_env() -> Self {
        let path = std::env::var(DATABASE_PATH_VAR)
            .unwrap_or_else(|_| DEFAULT_DATABASE_PATH.to_string());
        Self::at(path)
    }

    /// Fresh in-memory store, for tests and demos
    pub fn memory() -> Result<Self, StoreError> {
        let seq = MEMORY_STORE_SEQ.fetch_add(1, Ordering::Relaxed);
        let uri = format!("file:rwd-cohort-{seq}?mode=memory&cache=shared");
        let anchor = Connection::open_with_flags(&uri, memory_flags())?;
        Ok(Self {
            kind: StoreKind::Memory {
                uri,
                _anchor: anchor,
            },
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        })
    }

    /// Override the per-connection execution bound
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    /// Database file path, if this store is file-backed
    pub fn path(&self) -> Option<&Path> {
        match &self.kind {
            StoreKind::File(path) => Some(path),
            StoreKind::Memory { .. } => None,
        }
    }

    /// Open a scoped connection; fails if a file-backed database is missing
    pub fn open(&self) -> Result<Connection, StoreError> {
        let conn = match &self.kind {
            StoreKind::File(path) => {
                if !path.exists() {
                    return Err(StoreError::not_found(path.clone()));
                }
                Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_WRITE)?
            }
            StoreKind::Memory { uri, .. } => Connection::open_with_flags(uri, memory_flags())?,
        };
        self.configure(&conn)?;
        Ok(conn)
    }

    /// Open a scoped connection, creating the database file if needed
    ///
    /// Used by the seeder; regular query paths go through [`Store::open`].
    pub fn open_or_create(&self) -> Result<Connection, StoreError> {
        let conn = match &self.kind {
            StoreKind::File(path) => {
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() && !parent.exists() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                Connection::open(path)?
            }
            StoreKind::Memory { uri, .. } => Connection::open_with_flags(uri, memory_flags())?,
        };
        self.configure(&conn)?;
        Ok(conn)
    }

    fn configure(&self, conn: &Connection) -> Result<(), StoreError> {
        conn.busy_timeout(self.query_timeout)?;
        // The connection is scoped to a single operation, so a deadline fixed
        // at open time bounds that operation.
        let deadline = Instant::now() + self.query_timeout;
        conn.progress_handler(PROGRESS_OPS, Some(move || Instant::now() > deadline));
        Ok(())
    }
}

fn memory_flags() -> OpenFlags {
    OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE | OpenFlags::SQLITE_OPEN_URI
}
