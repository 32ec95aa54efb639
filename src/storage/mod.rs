//! Tabular query interface over the article archive
//!
//! This module owns the boundary between SQL and the analysis core:
//! - [`ArchiveSession`] executes parameterized SQL and returns a [`ResultSet`]
//! - [`Row`] resolves named columns into Rust types via [`FromValue`]
//! - [`Dialect`] renders the few SQL fragments that differ between backends
//!
//! Two sessions are provided: [`PostgresArchive`] for the production archive
//! and [`SqliteArchive`] for local snapshots and tests.

pub mod postgres;
pub mod repository;
pub mod sqlite;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use thiserror::Error;

pub use postgres::PostgresArchive;
pub use repository::{ArticleRepository, DocumentFilter};
pub use sqlite::SqliteArchive;

/// Errors raised by the query layer
///
/// These are surfaced unmodified to the caller of an analysis; the core never
/// retries them.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("connection pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("connection unavailable: {0}")]
    Connection(String),

    #[error("column not found: {0}")]
    MissingColumn(String),

    #[error("column {column}: expected {expected}, found {found}")]
    TypeMismatch {
        column: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("column {column}: unsupported SQL type {type_name}")]
    UnsupportedType { column: String, type_name: String },

    #[error("column {column}: invalid value: {message}")]
    InvalidValue { column: String, message: String },
}

impl QueryError {
    /// Whether a retry by the orchestration layer could succeed
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Postgres(_) | Self::Pool(_) | Self::Connection(_)
        )
    }
}

/// SQL dialect spoken by a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Postgres,
    Sqlite,
}

impl Dialect {
    /// Positional placeholder for the `index`-th (1-based) parameter
    ///
    /// PostgreSQL infers parameter types from context, so integer and text
    /// parameters carry an explicit cast to match the bound Rust type.
    #[must_use]
    pub fn placeholder(&self, index: usize, param: &Param) -> String {
        match self {
            Self::Postgres => match param {
                Param::Int(_) => format!("${index}::bigint"),
                Param::Float(_) => format!("${index}::float8"),
                Param::Text(_) => format!("${index}::text"),
            },
            Self::Sqlite => format!("?{index}"),
        }
    }

    /// Integer calendar year of a date/timestamp column
    #[must_use]
    pub fn year_of(&self, column: &str) -> String {
        match self {
            Self::Postgres => format!("EXTRACT(YEAR FROM {column})::int"),
            Self::Sqlite => format!("CAST(strftime('%Y', {column}) AS INTEGER)"),
        }
    }

    /// `YYYY-MM` month label of a date/timestamp column
    #[must_use]
    pub fn month_of(&self, column: &str) -> String {
        match self {
            Self::Postgres => format!("to_char({column}, 'YYYY-MM')"),
            Self::Sqlite => format!("strftime('%Y-%m', {column})"),
        }
    }

    /// Case-insensitive LIKE operator
    ///
    /// SQLite's LIKE only folds ASCII letters.
    #[must_use]
    pub fn ilike(&self) -> &'static str {
        match self {
            Self::Postgres => "ILIKE",
            Self::Sqlite => "LIKE",
        }
    }

    /// Cast a numeric aggregate to a float column
    #[must_use]
    pub fn as_float(&self, expr: &str) -> String {
        match self {
            Self::Postgres => format!("({expr})::float8"),
            Self::Sqlite => format!("CAST({expr} AS REAL)"),
        }
    }

    /// Cast a count aggregate to a 64-bit integer column
    #[must_use]
    pub fn as_bigint(&self, expr: &str) -> String {
        match self {
            Self::Postgres => format!("({expr})::bigint"),
            Self::Sqlite => expr.to_string(),
        }
    }

    /// Cast a date column to a timestamp column
    #[must_use]
    pub fn as_timestamp(&self, expr: &str) -> String {
        match self {
            Self::Postgres => format!("({expr})::timestamp"),
            Self::Sqlite => expr.to_string(),
        }
    }
}

/// Bound query parameter
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<i64> for Param {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Param {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<f64> for Param {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Param {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Typed column value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
}

impl Value {
    /// Name of the variant, used in type mismatch errors
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Bytes(_) => "bytes",
            Self::Date(_) => "date",
            Self::Timestamp(_) => "timestamp",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v}"),
            Self::Bytes(v) => write!(f, "<{} bytes>", v.len()),
            Self::Date(v) => write!(f, "{v}"),
            Self::Timestamp(v) => write!(f, "{v}"),
        }
    }
}

/// Conversion from a column value into a Rust type
pub trait FromValue: Sized {
    fn from_value(column: &str, value: &Value) -> Result<Self, QueryError>;
}

fn mismatch(column: &str, expected: &'static str, value: &Value) -> QueryError {
    QueryError::TypeMismatch {
        column: column.to_string(),
        expected,
        found: value.kind(),
    }
}

impl FromValue for i64 {
    fn from_value(column: &str, value: &Value) -> Result<Self, QueryError> {
        match value {
            Value::Int(v) => Ok(*v),
            Value::Bool(v) => Ok(i64::from(*v)),
            other => Err(mismatch(column, "int", other)),
        }
    }
}

impl FromValue for i32 {
    fn from_value(column: &str, value: &Value) -> Result<Self, QueryError> {
        let wide = i64::from_value(column, value)?;
        i32::try_from(wide).map_err(|e| QueryError::InvalidValue {
            column: column.to_string(),
            message: e.to_string(),
        })
    }
}

impl FromValue for u64 {
    fn from_value(column: &str, value: &Value) -> Result<Self, QueryError> {
        let wide = i64::from_value(column, value)?;
        u64::try_from(wide).map_err(|e| QueryError::InvalidValue {
            column: column.to_string(),
            message: e.to_string(),
        })
    }
}

impl FromValue for f64 {
    fn from_value(column: &str, value: &Value) -> Result<Self, QueryError> {
        match value {
            Value::Float(v) => Ok(*v),
            Value::Int(v) => Ok(*v as f64),
            other => Err(mismatch(column, "float", other)),
        }
    }
}

impl FromValue for String {
    fn from_value(column: &str, value: &Value) -> Result<Self, QueryError> {
        match value {
            Value::Text(v) => Ok(v.clone()),
            other => Err(mismatch(column, "text", other)),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(column: &str, value: &Value) -> Result<Self, QueryError> {
        match value {
            Value::Bytes(v) => Ok(v.clone()),
            Value::Text(v) => Ok(v.clone().into_bytes()),
            other => Err(mismatch(column, "bytes", other)),
        }
    }
}

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

impl FromValue for NaiveDateTime {
    fn from_value(column: &str, value: &Value) -> Result<Self, QueryError> {
        match value {
            Value::Timestamp(v) => Ok(*v),
            Value::Date(d) => Ok(d.and_time(chrono::NaiveTime::default())),
            // SQLite stores dates as text
            Value::Text(raw) => parse_timestamp(raw).ok_or_else(|| QueryError::InvalidValue {
                column: column.to_string(),
                message: format!("unrecognized timestamp '{raw}'"),
            }),
            other => Err(mismatch(column, "timestamp", other)),
        }
    }
}

impl FromValue for NaiveDate {
    fn from_value(column: &str, value: &Value) -> Result<Self, QueryError> {
        match value {
            Value::Date(d) => Ok(*d),
            other => NaiveDateTime::from_value(column, other).map(|ts| ts.date()),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(column: &str, value: &Value) -> Result<Self, QueryError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(column, other).map(Some),
        }
    }
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_utc());
    }
    for format in TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ts);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(chrono::NaiveTime::default()))
}

/// One row of a result set
#[derive(Debug, Clone)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    #[must_use]
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    /// Raw value of a named column
    pub fn value(&self, column: &str) -> Result<&Value, QueryError> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|idx| self.values.get(idx))
            .ok_or_else(|| QueryError::MissingColumn(column.to_string()))
    }

    /// Typed value of a named column
    pub fn get<T: FromValue>(&self, column: &str) -> Result<T, QueryError> {
        T::from_value(column, self.value(column)?)
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

/// Ordered rows sharing one column layout
#[derive(Debug, Clone)]
pub struct ResultSet {
    columns: Arc<[String]>,
    rows: Vec<Row>,
}

impl ResultSet {
    #[must_use]
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns: columns.into(),
            rows: Vec::new(),
        }
    }

    /// Append a row; values must follow the column layout
    pub fn push(&mut self, values: Vec<Value>) {
        self.rows.push(Row::new(Arc::clone(&self.columns), values));
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First row, if any
    #[must_use]
    pub fn first(&self) -> Option<&Row> {
        self.rows.first()
    }
}

impl IntoIterator for ResultSet {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

/// An open session against the archive
///
/// Sessions are created by the caller and passed explicitly into every
/// analysis call; nothing in the crate holds a global connection.
#[async_trait]
pub trait ArchiveSession: Send + Sync {
    /// Dialect used to render backend-specific SQL
    fn dialect(&self) -> Dialect;

    /// Short backend label for logs and metrics
    fn backend(&self) -> &'static str;

    /// Execute a query with positional parameters
    async fn query(&self, sql: &str, params: &[Param]) -> Result<ResultSet, QueryError>;
}
