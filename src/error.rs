//! Error types for txn-extract.
//!
//! Every failure in the pipeline is fatal, so one flat enum is enough.

use thiserror::Error;

/// Main error type for extraction runs.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Database connection errors (host unreachable, auth failed, missing database, etc.)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution errors (syntax errors, missing tables, undecodable values, etc.)
    #[error("Query error: {0}")]
    Query(String),

    /// Errors writing the delimited output file.
    #[error("Export error: {0}")]
    Export(String),

    /// Configuration errors (invalid config file, bad connection string, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal application errors (broken invariants, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ExtractError {
    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates an export error with the given message.
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connection(_) => "Connection Error",
            Self::Query(_) => "Query Error",
            Self::Export(_) => "Export Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

/// Result type alias using ExtractError.
pub type Result<T> = std::result::Result<T, ExtractError>;
