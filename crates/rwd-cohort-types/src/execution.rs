//! SQL execution results
//!
//! The guarded executor never raises across its boundary: every outcome,
//! including safety rejections and driver errors, is an `ExecutionResult`
//! with `ok` set accordingly. The JSON spellings (`execution_summary.n`,
//! `error_type` values) match the upstream orchestration layer and must not
//! drift.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A result row as an ordered column -> value map
///
/// Column order from the query's result descriptor is preserved.
pub type Row = IndexMap<String, serde_json::Value>;

/// Output mode for SQL execution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Row count only (default, safest)
    #[default]
    Count,
    /// Count plus the first 10 rows
    Preview,
    /// All rows
    Full,
}

impl ExecutionMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Preview => "preview",
            Self::Full => "full",
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognized mode string
#[derive(Debug, Clone, Error)]
#[error("Invalid mode '{0}'. Use 'count', 'preview', or 'full'")]
pub struct InvalidMode(pub String);

impl FromStr for ExecutionMode {
    type Err = InvalidMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "count" => Ok(Self::Count),
            "preview" => Ok(Self::Preview),
            "full" => Ok(Self::Full),
            other => Err(InvalidMode(other.to_string())),
        }
    }
}

/// Classification of an execution failure
///
/// Driver errors are classified by substring matching on the lower-cased
/// driver message. Brittle but deterministic; the strings are part of the
/// wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Denylisted keyword detected; rejected before execution
    SafetyViolation,
    /// Driver message contained "syntax error"
    SyntaxError,
    /// Driver message contained "no such table" or "no such column"
    SchemaError,
    /// Other query-engine failure
    OperationalError,
    /// Non-query driver failure
    DatabaseError,
    /// Anything else (e.g. the store itself was unreachable)
    UnknownError,
    /// Caller passed an unrecognized mode string
    InvalidMode,
}

impl ErrorKind {
    /// Wire spelling of this kind
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SafetyViolation => "safety_violation",
            Self::SyntaxError => "syntax_error",
            Self::SchemaError => "schema_error",
            Self::OperationalError => "operational_error",
            Self::DatabaseError => "database_error",
            Self::UnknownError => "unknown_error",
            Self::InvalidMode => "invalid_mode",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row count and wall-clock timing for a successful execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionSummary {
    /// Number of rows the query produced
    #[serde(rename = "n")]
    pub row_count: usize,
    /// Elapsed wall-clock time in milliseconds, rounded to 2 decimals
    pub timing_ms: f64,
}

/// Outcome of one guarded SQL execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Whether the query executed successfully
    pub ok: bool,
    /// Present on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_summary: Option<ExecutionSummary>,
    /// Rows returned (empty in count mode, capped at 10 in preview mode)
    #[serde(default)]
    pub preview_rows: Vec<Row>,
    /// Non-fatal notices (truncation, large result sets)
    #[serde(default)]
    pub warnings: Vec<String>,
    /// Error message, present on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Error classification, present on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<ErrorKind>,
}

impl ExecutionResult {
    /// Successful execution with the given summary and rows
    pub fn success(row_count: usize, timing_ms: f64, preview_rows: Vec<Row>) -> Self {
        Self {
            ok: true,
            execution_summary: Some(ExecutionSummary {
                row_count,
                timing_ms,
            }),
            preview_rows,
            warnings: Vec::new(),
            error: None,
            error_type: None,
        }
    }

    /// Failed execution with a message and classification
    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            execution_summary: None,
            preview_rows: Vec::new(),
            warnings: Vec::new(),
            error: Some(message.into()),
            error_type: Some(kind),
        }
    }

    /// Append a warning
    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    /// Row count, or 0 for failures
    pub fn row_count(&self) -> usize {
        self.execution_summary
            .as_ref()
            .map(|s| s.row_count)
            .unwrap_or(0)
    }

    /// First row's value for `column`, if present and numeric
    ///
    /// Count queries return a single row like `{"cnt": 420}`; this is the
    /// accessor the funnel engine uses to read it.
    pub fn scalar_i64(&self, column: &str) -> Option<i64> {
        self.preview_rows.first()?.get(column)?.as_i64()
    }
}
