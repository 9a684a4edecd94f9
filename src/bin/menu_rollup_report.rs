//! menu-rollup-report: derived table dump
//!
//! Prints the stored summary rows for a date and every preference segment
//! as a single JSON document on stdout.

use std::process::ExitCode;

use chrono::Utc;
use clap::Parser;
use tracing::error;

use menu_rollup::cli::{resolve_date, ReportArgs};
use menu_rollup::config::Config;
use menu_rollup::services::ReportQueries;
use menu_rollup::storage::connect;
use menu_rollup::utils::bootstrap::init_tracing;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let args = ReportArgs::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "menu-rollup-report failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: ReportArgs) -> Result<(), Box<dyn std::error::Error>> {
    let date = resolve_date(args.date.as_deref(), Utc::now().date_naive())?;
    let config = Config::load(args.config.as_deref())?;
    let session = connect(&config.storage).await?;

    let queries = ReportQueries::new(&session);
    let outcome = async {
        let summary = queries.daily_summary(date).await?;
        let segments = queries.segments().await?;
        Ok::<_, menu_rollup::RollupError>((summary, segments))
    }
    .await;
    session.close().await;

    let (summary, segments) = outcome?;
    let document = serde_json::json!({
        "summary": summary,
        "segments": segments,
    });
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}
