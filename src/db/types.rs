//! Query result types for txn-extract.
//!
//! Defines the structures used to represent query results from the database.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use rust_decimal::Decimal;
use std::fmt;
use std::time::Duration;

/// Represents the result of executing a SQL query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    /// Column metadata for the result set.
    pub columns: Vec<ColumnInfo>,

    /// Rows of data.
    pub rows: Vec<Row>,

    /// Time taken to execute the query and fetch every row.
    pub execution_time: Duration,

    /// Number of rows in the result.
    pub row_count: usize,
}

impl QueryResult {
    /// Creates a query result with the given columns and rows.
    pub fn with_data(columns: Vec<ColumnInfo>, rows: Vec<Row>) -> Self {
        let row_count = rows.len();
        Self {
            columns,
            rows,
            execution_time: Duration::ZERO,
            row_count,
        }
    }

    /// Sets the execution time.
    pub fn with_execution_time(mut self, duration: Duration) -> Self {
        self.execution_time = duration;
        self
    }

    /// Returns true if the result set is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the column names in result order.
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }
}

/// Metadata about a column in a result set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,

    /// Column data type as reported by the driver.
    pub data_type: String,
}

impl ColumnInfo {
    /// Creates a new column info with the given name and type.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

/// A row of data from a query result.
pub type Row = Vec<Value>;

/// Represents a single value from a database query.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// NULL value.
    #[default]
    Null,

    /// Boolean value.
    Bool(bool),

    /// Signed integer (up to i64).
    Int(i64),

    /// Unsigned integer (MySQL `UNSIGNED` columns).
    UInt(u64),

    /// Floating point number.
    Float(f64),

    /// Exact fixed-point number (`DECIMAL` / `NUMERIC`).
    Decimal(Decimal),

    /// Calendar date.
    Date(NaiveDate),

    /// Time of day.
    Time(NaiveTime),

    /// Date and time without a zone (`DATETIME`).
    DateTime(NaiveDateTime),

    /// Instant in UTC (`TIMESTAMP`).
    Timestamp(DateTime<Utc>),

    /// Text/string value.
    String(String),

    /// Binary data.
    Bytes(Vec<u8>),
}

/// How fractional seconds of temporal values are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Subseconds {
    /// Only when non-zero, in as few digit groups as needed.
    #[default]
    Trimmed,

    /// Always six digits.
    Micros,
}

impl Subseconds {
    /// Picks the precision for a column so every value in it has the same shape.
    pub fn for_column<'a>(values: impl IntoIterator<Item = &'a Value>) -> Self {
        if values.into_iter().any(Value::has_subseconds) {
            Self::Micros
        } else {
            Self::Trimmed
        }
    }

    fn pattern(self) -> &'static str {
        match self {
            Self::Trimmed => "%.f",
            Self::Micros => "%.6f",
        }
    }
}

impl Value {
    /// Returns true for a time, datetime or timestamp with a non-zero fraction of a second.
    pub fn has_subseconds(&self) -> bool {
        match self {
            Value::Time(t) => t.nanosecond() != 0,
            Value::DateTime(dt) => dt.nanosecond() != 0,
            Value::Timestamp(ts) => ts.nanosecond() != 0,
            _ => false,
        }
    }

    /// Converts the value to the text shown on the console.
    pub fn to_display_string(&self) -> String {
        self.to_display_string_with(Subseconds::Trimmed)
    }

    /// Like [`Value::to_display_string`], with an explicit fractional-second precision.
    pub fn to_display_string_with(&self, subseconds: Subseconds) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            other => other.to_export_string_with(subseconds),
        }
    }

    /// Converts the value to the text written to an export file.
    ///
    /// NULL becomes an empty field. Every other variant is rendered
    /// losslessly: decimals keep their scale and floats keep a fractional part.
    pub fn to_export_string(&self) -> String {
        self.to_export_string_with(Subseconds::Trimmed)
    }

    /// Like [`Value::to_export_string`], with an explicit fractional-second precision.
    pub fn to_export_string_with(&self, subseconds: Subseconds) -> String {
        let fraction = subseconds.pattern();
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::UInt(u) => u.to_string(),
            Value::Float(f) => format!("{f:?}"),
            Value::Decimal(d) => d.to_string(),
            Value::Date(d) => d.format("%Y-%m-%d").to_string(),
            Value::Time(t) => t.format(&format!("%H:%M:%S{fraction}")).to_string(),
            Value::DateTime(dt) => dt
                .format(&format!("%Y-%m-%d %H:%M:%S{fraction}"))
                .to_string(),
            Value::Timestamp(ts) => ts
                .format(&format!("%Y-%m-%d %H:%M:%S{fraction}%:z"))
                .to_string(),
            Value::String(s) => s.clone(),
            Value::Bytes(b) => hex_string(b),
        }
    }
}

fn hex_string(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(2 + bytes.len() * 2);
    out.push_str("0x");
    for byte in bytes {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display_string())
    }
}

// Conversion implementations for common types
impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UInt(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<NaiveTime> for Value {
    fn from(v: NaiveTime) -> Self {
        Value::Time(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}
