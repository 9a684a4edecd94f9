//! Command-line arguments shared by the binaries.

use chrono::NaiveDate;
use clap::Parser;

use crate::error::{Result, RollupError};
use crate::services::ReconcileScope;
use crate::storage::helpers::{format_date, DATE_FORMAT};

/// Message shown for a date argument that is not `YYYY-MM-DD`.
pub const INVALID_DATE_MESSAGE: &str = "Invalid date format. Please use YYYY-MM-DD";

/// Recompute the daily summary and customer preferences for one date.
#[derive(Debug, Parser)]
#[command(name = "menu-rollup")]
#[command(author, version, about, long_about = None)]
pub struct RollupArgs {
    /// Date to aggregate, YYYY-MM-DD. Defaults to yesterday (UTC).
    pub date: Option<String>,

    /// Reconcile every customer in the order log.
    #[arg(long)]
    pub full: bool,

    /// Configuration file.
    #[arg(long)]
    pub config: Option<String>,
}

impl RollupArgs {
    /// `--full` overrides the configured scope.
    pub fn scope(&self, configured: ReconcileScope) -> ReconcileScope {
        if self.full {
            ReconcileScope::Full
        } else {
            configured
        }
    }
}

/// Append order lines read from stdin to the order log.
#[derive(Debug, Parser)]
#[command(name = "menu-rollup-ingest")]
#[command(author, version, about, long_about = None)]
pub struct IngestArgs {
    /// Configuration file.
    #[arg(long)]
    pub config: Option<String>,
}

/// Print the stored summary for a date and the preference segments as JSON.
#[derive(Debug, Parser)]
#[command(name = "menu-rollup-report")]
#[command(author, version, about, long_about = None)]
pub struct ReportArgs {
    /// Date to report, YYYY-MM-DD. Defaults to yesterday (UTC).
    pub date: Option<String>,

    /// Configuration file.
    #[arg(long)]
    pub config: Option<String>,
}

/// Resolve the target date.
///
/// `None` means the day before `today`. Anything other than a zero-padded
/// `YYYY-MM-DD` calendar date is [`RollupError::InvalidInput`].
pub fn resolve_date(raw: Option<&str>, today: NaiveDate) -> Result<NaiveDate> {
    let Some(raw) = raw else {
        return today
            .pred_opt()
            .ok_or_else(|| RollupError::InvalidInput(INVALID_DATE_MESSAGE.to_string()));
    };

    match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        Ok(date) if format_date(&date) == raw => Ok(date),
        _ => Err(RollupError::InvalidInput(INVALID_DATE_MESSAGE.to_string())),
    }
}
