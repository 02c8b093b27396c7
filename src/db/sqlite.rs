//! SQLite database client implementation.
//!
//! Opens database files read-only. Used for local extracts and as the fixture
//! backend in integration tests.

use crate::config::ConnectionConfig;
use crate::db::{ColumnInfo, DatabaseClient, QueryResult, Row, Value};
use crate::error::{ExtractError, Result};
use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{
    Column as SqlxColumn, ConnectOptions, Connection, Executor, Row as SqlxRow, Statement,
    TypeInfo, ValueRef,
};
use std::path::Path;
use std::time::Instant;
use tracing::debug;

/// SQLite database client holding one session.
#[derive(Debug)]
pub struct SqliteClient {
    conn: Option<SqliteConnection>,
}

impl SqliteClient {
    /// Opens the database file named by `config.database`.
    ///
    /// A missing file is a connection error; the file is never created.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let path = config
            .database
            .as_deref()
            .ok_or_else(|| ExtractError::config("SQLite database path is required"))?;

        debug!("Opening SQLite database {}", path);
        let conn = SqliteConnectOptions::new()
            .filename(Path::new(path))
            .create_if_missing(false)
            .read_only(true)
            .connect()
            .await
            .map_err(|e| map_connection_error(e, path))?;

        Ok(Self { conn: Some(conn) })
    }
}

#[async_trait]
impl DatabaseClient for SqliteClient {
    async fn execute_query(&mut self, sql: &str) -> Result<QueryResult> {
        let conn = self
            .conn
            .as_mut()
            .ok_or_else(|| ExtractError::connection("Connection is already closed"))?;

        let start = Instant::now();

        let statement = (&mut *conn)
            .prepare(sql)
            .await
            .map_err(|e| ExtractError::query(format_query_error(e)))?;

        let columns: Vec<ColumnInfo> = statement
            .columns()
            .iter()
            .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
            .collect();

        let mut rows: Vec<Row> = Vec::new();
        let mut stream = statement.query().fetch(&mut *conn);
        while let Some(row) = stream
            .try_next()
            .await
            .map_err(|e| ExtractError::query(format_query_error(e)))?
        {
            rows.push(convert_row(&row)?);
        }
        drop(stream);

        let execution_time = start.elapsed();
        debug!("Fetched {} rows in {:?}", rows.len(), execution_time);

        Ok(QueryResult::with_data(columns, rows).with_execution_time(execution_time))
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(conn) = self.conn.take() {
            conn.close()
                .await
                .map_err(|e| ExtractError::connection(format!("Failed to close connection: {e}")))?;
            debug!("Closed SQLite connection");
        }
        Ok(())
    }
}

fn convert_row(row: &SqliteRow) -> Result<Row> {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| {
            convert_value(row, i).map_err(|e| {
                ExtractError::query(format!("Failed to decode column '{}': {e}", col.name()))
            })
        })
        .collect()
}

/// Decodes a value by its storage class, since SQLite column types are only advisory.
fn convert_value(row: &SqliteRow, index: usize) -> std::result::Result<Value, sqlx::Error> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }
    let storage_class = raw.type_info().name().to_string();

    let value = match storage_class.as_str() {
        "INTEGER" => Value::Int(row.try_get_unchecked::<i64, _>(index)?),
        "REAL" => Value::Float(row.try_get_unchecked::<f64, _>(index)?),
        "BLOB" => Value::Bytes(row.try_get_unchecked::<Vec<u8>, _>(index)?),
        _ => Value::String(row.try_get_unchecked::<String, _>(index)?),
    };

    Ok(value)
}

fn map_connection_error(error: sqlx::Error, path: &str) -> ExtractError {
    let error_str = error.to_string().to_lowercase();

    if error_str.contains("unable to open") {
        ExtractError::connection(format!(
            "Cannot open SQLite database '{path}'. Check that the file exists and is readable."
        ))
    } else {
        ExtractError::connection(error.to_string())
    }
}

fn format_query_error(error: sqlx::Error) -> String {
    match error.as_database_error() {
        Some(db_error) => format!("ERROR: {}", db_error.message()),
        None => error.to_string(),
    }
}
