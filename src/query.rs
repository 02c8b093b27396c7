//! The fixed extraction query.

use crate::db::{DatabaseClient, QueryResult};
use crate::error::Result;
use tracing::{debug, info};

/// A query with a human-readable title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedQuery {
    /// Banner printed above the rendered result.
    pub title: &'static str,

    /// SQL text sent to the server.
    pub sql: &'static str,
}

/// High-value transactions touching an `AC00` account, newest first.
pub const FILTERED_TRANSACTIONS: FixedQuery = FixedQuery {
    title: "Filtered transactions (amount > 1000, AC00*, sorted by txn_date DESC):",
    sql: "SELECT *
FROM t2
WHERE amount > 1000
  AND (source_ac LIKE 'AC00%' OR destination_ac LIKE 'AC00%')
ORDER BY txn_date DESC",
};

impl FixedQuery {
    /// Runs the query to completion and returns every row.
    ///
    /// Errors are returned unchanged; the caller owns the connection and
    /// decides when to close it.
    pub async fn run(&self, client: &mut dyn DatabaseClient) -> Result<QueryResult> {
        let result = client.execute_query(self.sql).await?;
        for column in &result.columns {
            debug!(name = %column.name, data_type = %column.data_type, "Result column");
        }
        info!(
            rows = result.row_count,
            columns = result.columns.len(),
            elapsed_ms = result.execution_time.as_millis() as u64,
            "Query finished"
        );
        Ok(result)
    }
}
