//! txn-extract - Exports high-value AC00 transactions from MySQL to CSV.

use tracing::{error, info};
use txn_extract::cli::Cli;
use txn_extract::config::Config;
use txn_extract::error::Result;
use txn_extract::logging;
use txn_extract::pipeline::{self, RunSettings};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // A missing .env file is not an error
    dotenvy::dotenv().ok();
    logging::init_stderr_logging();

    if let Err(e) = run().await {
        error!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)?;

    // Precedence: CLI arguments, named connection, default connection, environment
    let connection = cli.resolve_connection(&config)?;

    let mut settings = RunSettings {
        export: config.export.clone(),
        display: config.display,
    };
    cli.apply_export_overrides(&mut settings.export);
    settings.export.validate()?;

    let mut stdout = std::io::stdout().lock();
    let summary = pipeline::run(&connection, &settings, &mut stdout).await?;

    info!(
        rows = summary.row_count,
        columns = summary.column_count,
        path = %summary.output_path.display(),
        "Extraction complete"
    );
    Ok(())
}
