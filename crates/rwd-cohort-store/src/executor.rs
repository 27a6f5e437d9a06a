//! Guarded SQL execution
//!
//! Executes read-only SQL with a destructive-keyword guard, wall-clock
//! timing, row-count summarization, and mode-dependent preview truncation.
//! Failures never cross the [`SqlExecutor::run`] boundary as `Err`; they are
//! converted into [`ExecutionResult`]s with `ok = false` and a classified
//! `error_type`.
//!
//! The destructive guard is textual, not a parser: it scans the upper-cased
//! query for denylisted keywords and therefore false-positives on a keyword
//! appearing inside a quoted value or column alias. Known limitation, kept
//! for compatibility with the upstream contract.

use crate::error::StoreError;
use crate::store::Store;
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use rwd_cohort_types::{ErrorKind, ExecutionMode, ExecutionResult, Row};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Keywords that reject a query before execution
pub const DESTRUCTIVE_KEYWORDS: [&str; 6] =
    ["DROP", "DELETE", "TRUNCATE", "UPDATE", "INSERT", "ALTER"];

/// Preview mode returns at most this many rows
const PREVIEW_ROW_CAP: usize = 10;

/// Full mode warns above this many rows
const LARGE_RESULT_THRESHOLD: usize = 1000;

/// Guarded SQL executor over a [`Store`]
pub struct SqlExecutor {
    store: Arc<Store>,
}

impl SqlExecutor {
    /// Create an executor over the given store
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// The underlying store
    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Execute SQL with safety checks
    ///
    /// Infallible at the signature level: every failure is reported inside
    /// the returned [`ExecutionResult`].
    pub fn run(&self, sql: &str, mode: ExecutionMode) -> ExecutionResult {
        if let Some(keyword) = destructive_keyword(sql) {
            return ExecutionResult::failure(
                ErrorKind::SafetyViolation,
                format!("Destructive operation '{keyword}' not allowed"),
            );
        }

        log::debug!("executing sql (mode={mode}, {} bytes)", sql.len());

        let conn = match self.store.open() {
            Ok(conn) => conn,
            Err(err) => return classify_store_error(err),
        };

        let (rows, timing_ms) = match fetch_all(&conn, sql) {
            Ok(fetched) => fetched,
            Err(err) => return classify_driver_error(&err),
        };
        let row_count = rows.len();

        match mode {
            ExecutionMode::Count => ExecutionResult::success(row_count, timing_ms, Vec::new()),
            ExecutionMode::Preview => {
                let truncated = row_count > PREVIEW_ROW_CAP;
                let preview: Vec<Row> = rows.into_iter().take(PREVIEW_ROW_CAP).collect();
                let result = ExecutionResult::success(row_count, timing_ms, preview);
                if truncated {
                    result.with_warning(format!("Showing {PREVIEW_ROW_CAP} of {row_count} rows"))
                } else {
                    result
                }
            }
            ExecutionMode::Full => {
                let result = ExecutionResult::success(row_count, timing_ms, rows);
                if row_count > LARGE_RESULT_THRESHOLD {
                    result.with_warning(format!("Large result set: {row_count} rows returned"))
                } else {
                    result
                }
            }
        }
    }

    /// Execute SQL with the mode given as text
    ///
    /// This is the JSON entry point; an unrecognized mode fails with
    /// `invalid_mode` instead of panicking or defaulting.
    pub fn run_str(&self, sql: &str, mode: &str) -> ExecutionResult {
        match mode.parse::<ExecutionMode>() {
            Ok(mode) => self.run(sql, mode),
            Err(err) => ExecutionResult::failure(ErrorKind::InvalidMode, err.to_string()),
        }
    }

    /// Get the query execution plan
    pub fn explain(&self, sql: &str) -> QueryPlan {
        let attempt = || -> Result<Vec<PlanStep>, StoreError> {
            let conn = self.store.open()?;
            let (rows, _) = fetch_all(&conn, &format!("EXPLAIN QUERY PLAN {sql}"))?;
            Ok(rows
                .iter()
                .map(|row| PlanStep {
                    detail: row
                        .get("detail")
                        .and_then(|v| v.as_str())
                        .unwrap_or_default()
                        .to_string(),
                })
                .collect())
        };
        match attempt() {
            Ok(steps) => QueryPlan {
                ok: true,
                query_plan: steps,
                error: None,
            },
            Err(err) => QueryPlan {
                ok: false,
                query_plan: Vec::new(),
                error: Some(err.to_string()),
            },
        }
    }

    /// Check SQL syntax by preparing without executing
    pub fn validate(&self, sql: &str) -> SqlValidation {
        let attempt = || -> Result<(), StoreError> {
            let conn = self.store.open()?;
            conn.prepare(&format!("EXPLAIN {sql}"))?;
            Ok(())
        };
        match attempt() {
            Ok(()) => SqlValidation {
                valid: true,
                message: "SQL syntax is valid".to_string(),
            },
            Err(err) => SqlValidation {
                valid: false,
                message: err.to_string(),
            },
        }
    }
}

/// One step of a query execution plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStep {
    pub detail: String,
}

/// Result of [`SqlExecutor::explain`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryPlan {
    pub ok: bool,
    pub query_plan: Vec<PlanStep>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of [`SqlExecutor::validate`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlValidation {
    pub valid: bool,
    pub message: String,
}

/// First denylisted keyword found in the upper-cased query, if any
fn destructive_keyword(sql: &str) -> Option<&'static str> {
    let upper = sql.to_uppercase();
    DESTRUCTIVE_KEYWORDS
        .iter()
        .copied()
        .find(|keyword| upper.contains(keyword))
}

/// Execute and collect all rows as ordered column -> value maps
fn fetch_all(conn: &Connection, sql: &str) -> Result<(Vec<Row>, f64), rusqlite::Error> {
    let mut stmt = conn.prepare(sql)?;
    let column_names: Vec<String> = stmt
        .column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();

    let start = Instant::now();
    let mut cursor = stmt.query([])?;
    let mut rows = Vec::new();
    while let Some(row) = cursor.next()? {
        let mut map = Row::with_capacity(column_names.len());
        for (idx, name) in column_names.iter().enumerate() {
            map.insert(name.clone(), json_value(row.get_ref(idx)?));
        }
        rows.push(map);
    }
    let timing_ms = round2(start.elapsed().as_secs_f64() * 1000.0);
    Ok((rows, timing_ms))
}

fn json_value(value: ValueRef<'_>) -> serde_json::Value {
    match value {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Integer(i) => serde_json::Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Text(text) => {
            serde_json::Value::String(String::from_utf8_lossy(text).into_owned())
        }
        ValueRef::Blob(blob) => {
            serde_json::Value::String(String::from_utf8_lossy(blob).into_owned())
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Classification for failures before the driver was reached
fn classify_store_error(err: StoreError) -> ExecutionResult {
    match err {
        StoreError::Database(driver) => classify_driver_error(&driver),
        other => ExecutionResult::failure(ErrorKind::UnknownError, other.to_string()),
    }
}

/// Classify a driver error by substring matching on its lower-cased message
fn classify_driver_error(err: &rusqlite::Error) -> ExecutionResult {
    let message = err.to_string();
    let lower = message.to_lowercase();
    let kind = if lower.contains("syntax error") {
        ErrorKind::SyntaxError
    } else if lower.contains("no such table") || lower.contains("no such column") {
        ErrorKind::SchemaError
    } else if matches!(err, rusqlite::Error::SqliteFailure(..)) {
        ErrorKind::OperationalError
    } else {
        ErrorKind::DatabaseError
    };
    ExecutionResult::failure(kind, message)
}
