//! The extraction run: connect, query, tabulate, print, export.

use crate::config::{ConnectionConfig, DisplayConfig, ExportConfig};
use crate::db::{self, DatabaseClient};
use crate::error::{ExtractError, Result};
use crate::export::CsvExporter;
use crate::query::FILTERED_TRANSACTIONS;
use crate::table::Table;
use crate::timer::{format_elapsed, Stopwatch};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

/// Output settings for a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSettings {
    pub export: ExportConfig,
    pub display: DisplayConfig,
}

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub row_count: usize,
    pub column_count: usize,
    pub output_path: PathBuf,
    pub elapsed: Duration,
}

/// Runs the whole extraction against the configured database.
///
/// Console output goes to `out`. Timing starts before the connection is
/// opened and stops after the export file is in place.
pub async fn run<W: Write>(
    connection: &ConnectionConfig,
    settings: &RunSettings,
    out: &mut W,
) -> Result<RunSummary> {
    let stopwatch = Stopwatch::start();

    info!(
        backend = connection.backend.as_str(),
        "Connecting to {}",
        connection.display_string()
    );
    let client = db::connect(connection).await?;

    run_with_client(client, settings, stopwatch, out).await
}

/// Runs the extraction on an already open session.
///
/// The session is closed before this returns, whether the query succeeded
/// or not. Nothing is written to the export path unless the query succeeded.
pub async fn run_with_client<W: Write>(
    mut client: Box<dyn DatabaseClient>,
    settings: &RunSettings,
    stopwatch: Stopwatch,
    out: &mut W,
) -> Result<RunSummary> {
    let table = fetch_table(client.as_mut()).await?;

    print(out, FILTERED_TRANSACTIONS.title)?;
    print(out, &table.render(&settings.display))?;

    CsvExporter::from_config(&settings.export).write_file(&table, &settings.export.path)?;

    let elapsed = stopwatch.elapsed();
    print(out, &format!("\n{}", format_elapsed(elapsed)))?;

    Ok(RunSummary {
        row_count: table.row_count(),
        column_count: table.column_count(),
        output_path: settings.export.path.clone(),
        elapsed,
    })
}

/// Runs the fixed query and releases the session on every path.
async fn fetch_table(client: &mut dyn DatabaseClient) -> Result<Table> {
    let fetched = FILTERED_TRANSACTIONS.run(client).await;

    if let Err(e) = client.close().await {
        // The rows are already in memory; a failed close does not invalidate them.
        warn!("{e}");
    } else {
        info!("Connection closed");
    }

    Table::from_query_result(fetched?)
}

fn print<W: Write>(out: &mut W, text: &str) -> Result<()> {
    writeln!(out, "{text}")
        .map_err(|e| ExtractError::internal(format!("Failed to write to stdout: {e}")))
}
