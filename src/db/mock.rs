//! Mock database clients for testing.
//!
//! Provide canned results without a database server. Both clients expose a
//! shared flag so tests can check that the pipeline released the session.

use super::{DatabaseClient, QueryResult};
use crate::error::{ExtractError, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// A mock database client that returns a predefined result for any query.
#[derive(Debug, Default)]
pub struct MockDatabaseClient {
    result: QueryResult,
    closed: Arc<AtomicBool>,
    queries: Vec<String>,
}

impl MockDatabaseClient {
    /// Creates a mock client whose every query returns `result`.
    pub fn new(result: QueryResult) -> Self {
        Self {
            result,
            closed: Arc::new(AtomicBool::new(false)),
            queries: Vec::new(),
        }
    }

    /// Returns a handle that turns true once the client is closed.
    pub fn closed_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.closed)
    }

    /// Returns the SQL text of every query executed so far.
    pub fn queries(&self) -> &[String] {
        &self.queries
    }
}

#[async_trait]
impl DatabaseClient for MockDatabaseClient {
    async fn execute_query(&mut self, sql: &str) -> Result<QueryResult> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ExtractError::connection("Connection is already closed"));
        }
        self.queries.push(sql.to_string());

        Ok(self
            .result
            .clone()
            .with_execution_time(Duration::from_millis(1)))
    }

    async fn close(&mut self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// A mock client whose queries always fail with a query error.
#[derive(Debug)]
pub struct FailingDatabaseClient {
    message: String,
    closed: Arc<AtomicBool>,
}

impl FailingDatabaseClient {
    /// Creates a client that fails every query with `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns a handle that turns true once the client is closed.
    pub fn closed_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.closed)
    }
}

#[async_trait]
impl DatabaseClient for FailingDatabaseClient {
    async fn execute_query(&mut self, _sql: &str) -> Result<QueryResult> {
        Err(ExtractError::query(self.message.clone()))
    }

    async fn close(&mut self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
