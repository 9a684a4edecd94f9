//! menu-rollup: daily order rollup
//!
//! Aggregates one date of the raw order log into per-category summary rows,
//! then reconciles the preference index for the customers in scope.
//!
//! ## Usage
//! ```text
//! menu-rollup [YYYY-MM-DD] [--full] [--config <path>]
//! ```
//! Without a date, the day before the current UTC date is processed.
//! Exits non-zero on malformed input or any read/write failure.
//!
//! ## Configuration
//! - MENU_ROLLUP_CONFIG: configuration file (YAML)
//! - MENU_ROLLUP__<SECTION>__<KEY>: per-key overrides
//! - MENU_ROLLUP_LOG: tracing filter (default: info)

use std::process::ExitCode;

use chrono::Utc;
use clap::Parser;
use tracing::{error, info};

use menu_rollup::cli::{resolve_date, RollupArgs};
use menu_rollup::config::Config;
use menu_rollup::services::Pipeline;
use menu_rollup::storage::connect;
use menu_rollup::utils::bootstrap::init_tracing;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let args = RollupArgs::parse();

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "menu-rollup failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: RollupArgs) -> Result<ExitCode, Box<dyn std::error::Error>> {
    // Validated before any store contact.
    let date = resolve_date(args.date.as_deref(), Utc::now().date_naive())?;

    let config = Config::load(args.config.as_deref())?;
    let scope = args.scope(config.reconcile.scope);

    let session = connect(&config.storage).await?;
    let outcome = Pipeline::new(&session, &config.reconcile)
        .run(date, scope)
        .await;
    session.close().await;

    let report = outcome?;
    if report.is_success() {
        info!(date = %date, "menu-rollup completed");
        Ok(ExitCode::SUCCESS)
    } else {
        for (category, e) in &report.summary.failures {
            eprintln!("summary {date} {category}: {e}");
        }
        for (customer, e) in &report.preferences.failures {
            eprintln!("preference {customer}: {e}");
        }
        if let Some(e) = &report.preferences.scope_error {
            eprintln!("customer scope: {e}");
        }
        error!(date = %date, "menu-rollup completed with failures");
        Ok(ExitCode::FAILURE)
    }
}
