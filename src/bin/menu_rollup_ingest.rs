//! menu-rollup-ingest: order log loader
//!
//! Reads `customer_id,timestamp,category` lines from stdin and appends them
//! to the raw order log. Rejected lines are reported on stderr; the exit
//! status is non-zero if any line was rejected or failed to store.

use std::process::ExitCode;

use clap::Parser;
use tokio::io::BufReader;
use tracing::error;

use menu_rollup::cli::IngestArgs;
use menu_rollup::config::Config;
use menu_rollup::services::ingest_lines;
use menu_rollup::storage::connect;
use menu_rollup::utils::bootstrap::init_tracing;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let args = IngestArgs::parse();

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "menu-rollup-ingest failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: IngestArgs) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = Config::load(args.config.as_deref())?;
    let session = connect(&config.storage).await?;

    let outcome = ingest_lines(&session, BufReader::new(tokio::io::stdin())).await;
    session.close().await;

    let report = outcome?;
    for (line, e) in report.rejected.iter().chain(&report.failed) {
        eprintln!("line {line}: {e}");
    }

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
