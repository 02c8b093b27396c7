//! MySQL database client implementation.
//!
//! Provides the `MySqlClient` struct that implements the `DatabaseClient` trait
//! for MySQL and MariaDB servers using a single sqlx connection.

use crate::config::ConnectionConfig;
use crate::db::{ColumnInfo, DatabaseClient, QueryResult, Row, Value};
use crate::error::{ExtractError, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use futures::TryStreamExt;
use rust_decimal::Decimal;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlDatabaseError, MySqlRow};
use sqlx::{
    Column as SqlxColumn, ConnectOptions, Connection, Executor, Row as SqlxRow, Statement,
    TypeInfo,
};
use std::time::Instant;
use tracing::debug;

/// MySQL server error number for a rejected login.
const ER_ACCESS_DENIED: u16 = 1045;

/// MySQL server error number for an unknown schema.
const ER_BAD_DB: u16 = 1049;

/// MySQL database client holding one session.
#[derive(Debug)]
pub struct MySqlClient {
    conn: Option<MySqlConnection>,
}

impl MySqlClient {
    /// Opens a single connection to the configured server.
    ///
    /// There is no retry: any failure is returned as a connection error.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let options = connect_options(config)?;

        debug!("Connecting to MySQL at {}", config.display_string());
        let conn = options
            .connect()
            .await
            .map_err(|e| map_connection_error(e, config))?;
        debug!("Successfully connected to database");

        Ok(Self { conn: Some(conn) })
    }
}

#[async_trait]
impl DatabaseClient for MySqlClient {
    async fn execute_query(&mut self, sql: &str) -> Result<QueryResult> {
        let conn = self
            .conn
            .as_mut()
            .ok_or_else(|| ExtractError::connection("Connection is already closed"))?;

        let start = Instant::now();

        // Column metadata comes from the prepared statement so it survives an empty result.
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
            debug!("Closed MySQL connection");
        }
        Ok(())
    }
}

/// Builds sqlx connect options from a resolved connection config.
fn connect_options(config: &ConnectionConfig) -> Result<MySqlConnectOptions> {
    let database = config
        .database
        .as_deref()
        .ok_or_else(|| ExtractError::config("Database name is required"))?;

    let mut options = MySqlConnectOptions::new()
        .host(config.host.as_deref().unwrap_or("localhost"))
        .database(database);

    if let Some(port) = config.effective_port() {
        options = options.port(port);
    }
    if let Some(user) = &config.user {
        options = options.username(user);
    }
    if let Some(password) = &config.password {
        options = options.password(password);
    }

    Ok(options)
}

/// Converts a sqlx MySqlRow to our Row type.
fn convert_row(row: &MySqlRow) -> Result<Row> {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| {
            convert_value(row, i, col.type_info().name()).map_err(|e| {
                ExtractError::query(format!("Failed to decode column '{}': {e}", col.name()))
            })
        })
        .collect()
}

/// How a MySQL column is decoded, keyed by the driver's type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    Null,
    Bool,
    Unsigned,
    Signed,
    Year,
    Float,
    Double,
    Decimal,
    Date,
    Time,
    DateTime,
    Timestamp,
    Binary,
    Text,
}

fn value_kind(type_name: &str) -> ValueKind {
    match type_name {
        "NULL" => ValueKind::Null,
        "BOOLEAN" => ValueKind::Bool,
        name if name.ends_with(" UNSIGNED") => ValueKind::Unsigned,
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => ValueKind::Signed,
        "YEAR" => ValueKind::Year,
        "FLOAT" => ValueKind::Float,
        "DOUBLE" => ValueKind::Double,
        "DECIMAL" => ValueKind::Decimal,
        "DATE" => ValueKind::Date,
        "TIME" => ValueKind::Time,
        "DATETIME" => ValueKind::DateTime,
        "TIMESTAMP" => ValueKind::Timestamp,
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BIT"
        | "GEOMETRY" => ValueKind::Binary,
        // CHAR, VARCHAR, TEXT variants, ENUM, SET, JSON
        _ => ValueKind::Text,
    }
}

/// Widens a FLOAT through its shortest decimal form, so 1500.1 stays 1500.1.
fn float_value(v: f32) -> Value {
    Value::Float(v.to_string().parse().unwrap_or(f64::from(v)))
}

/// Converts a single column value from a MySqlRow to our Value type.
fn convert_value(
    row: &MySqlRow,
    index: usize,
    type_name: &str,
) -> std::result::Result<Value, sqlx::Error> {
    let value = match value_kind(type_name) {
        ValueKind::Null => Value::Null,
        ValueKind::Bool => row.try_get::<Option<bool>, _>(index)?.into(),
        ValueKind::Unsigned => row.try_get::<Option<u64>, _>(index)?.into(),
        ValueKind::Signed => row.try_get::<Option<i64>, _>(index)?.into(),
        ValueKind::Year => row.try_get_unchecked::<Option<i64>, _>(index)?.into(),
        ValueKind::Float => row
            .try_get::<Option<f32>, _>(index)?
            .map_or(Value::Null, float_value),
        ValueKind::Double => row.try_get::<Option<f64>, _>(index)?.into(),
        ValueKind::Decimal => row.try_get::<Option<Decimal>, _>(index)?.into(),
        ValueKind::Date => row.try_get::<Option<NaiveDate>, _>(index)?.into(),
        ValueKind::Time => row.try_get::<Option<NaiveTime>, _>(index)?.into(),
        ValueKind::DateTime => row.try_get::<Option<NaiveDateTime>, _>(index)?.into(),
        ValueKind::Timestamp => row.try_get::<Option<DateTime<Utc>>, _>(index)?.into(),
        ValueKind::Binary => row.try_get_unchecked::<Option<Vec<u8>>, _>(index)?.into(),
        ValueKind::Text => row.try_get_unchecked::<Option<String>, _>(index)?.into(),
    };

    Ok(value)
}

/// Maps sqlx connection errors to user-friendly messages.
fn map_connection_error(error: sqlx::Error, config: &ConnectionConfig) -> ExtractError {
    let host = config.host.as_deref().unwrap_or("localhost");
    let port = config.effective_port().unwrap_or_default();
    let user = config.user.as_deref().unwrap_or("unknown");
    let database = config.database.as_deref().unwrap_or("unknown");

    let server_error = error
        .as_database_error()
        .and_then(|e| e.try_downcast_ref::<MySqlDatabaseError>())
        .map(|e| e.number());

    let error_str = error.to_string().to_lowercase();

    if server_error == Some(ER_ACCESS_DENIED) || error_str.contains("access denied") {
        ExtractError::connection(format!(
            "Authentication failed for user '{user}'. Check your credentials."
        ))
    } else if server_error == Some(ER_BAD_DB) || error_str.contains("unknown database") {
        ExtractError::connection(format!("Database '{database}' does not exist."))
    } else if error_str.contains("connection refused") {
        ExtractError::connection(format!(
            "Cannot connect to {host}:{port}. Check that the server is running."
        ))
    } else if error_str.contains("timed out") || error_str.contains("timeout") {
        ExtractError::connection(format!(
            "Connection to {host}:{port} timed out. The server may be overloaded or unreachable."
        ))
    } else {
        ExtractError::connection(error.to_string())
    }
}

/// Formats a query error the way the mysql client prints server errors.
fn format_query_error(error: sqlx::Error) -> String {
    match error.as_database_error() {
        Some(db_error) => match db_error.try_downcast_ref::<MySqlDatabaseError>() {
            Some(mysql_error) => format!(
                "ERROR {} ({}): {}",
                mysql_error.number(),
                mysql_error.code().unwrap_or("HY000"),
                mysql_error.message()
            ),
            None => format!("ERROR: {}", db_error.message()),
        },
        None => error.to_string(),
    }
}
