//! Database abstraction layer for txn-extract.
//!
//! Provides a trait-based interface over a single database session, so the
//! pipeline can run against MySQL, SQLite or an in-memory mock.

mod mock;
mod mysql;
mod sqlite;
mod types;

pub use mock::{FailingDatabaseClient, MockDatabaseClient};
pub use mysql::MySqlClient;
pub use sqlite::SqliteClient;
pub use types::{ColumnInfo, QueryResult, Row, Subseconds, Value};

use crate::config::ConnectionConfig;
use crate::error::Result;
use async_trait::async_trait;

/// Supported database backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    #[default]
    MySql,
    Sqlite,
}

impl DatabaseBackend {
    /// Returns the backend as a string for logs and config files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MySql => "mysql",
            Self::Sqlite => "sqlite",
        }
    }

    /// Parses a backend from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "mysql" | "mariadb" => Some(Self::MySql),
            "sqlite" | "sqlite3" => Some(Self::Sqlite),
            _ => None,
        }
    }

    /// Returns the default port for this backend, if it is networked.
    pub fn default_port(&self) -> Option<u16> {
        match self {
            Self::MySql => Some(3306),
            Self::Sqlite => None,
        }
    }
}

/// Opens a database session for the given configuration.
///
/// This is the central factory function for database connections.
pub async fn connect(config: &ConnectionConfig) -> Result<Box<dyn DatabaseClient>> {
    match config.backend {
        DatabaseBackend::MySql => {
            let client = MySqlClient::connect(config).await?;
            Ok(Box::new(client))
        }
        DatabaseBackend::Sqlite => {
            let client = SqliteClient::connect(config).await?;
            Ok(Box::new(client))
        }
    }
}

/// Trait defining the interface for a single database session.
///
/// A client owns exactly one connection. After `close` every further call
/// to `execute_query` fails with a connection error.
#[async_trait]
pub trait DatabaseClient: Send {
    /// Executes a SQL query and returns every row together with column metadata.
    ///
    /// Column metadata is present even when the query matches no rows.
    async fn execute_query(&mut self, sql: &str) -> Result<QueryResult>;

    /// Closes the database connection. Closing twice is a no-op.
    async fn close(&mut self) -> Result<()>;
}
