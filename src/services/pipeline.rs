//! Pipeline driver: one date in, summary rows and preferences out.
//!
//! The aggregator's date scan is the only pass over the date partition.
//! The customers it saw become the incremental reconciliation scope.

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use tracing::info;

use crate::config::ReconcileConfig;
use crate::error::Result;
use crate::services::aggregate::{SummaryAggregator, SummaryReport};
use crate::services::reader::OrderReader;
use crate::services::reconcile::{PreferenceReconciler, ReconcileReport, ReconcileScope};
use crate::storage::Session;

/// Outcome of one pipeline run.
#[derive(Debug)]
pub struct RunReport {
    pub date: NaiveDate,
    pub scope: ReconcileScope,
    pub summary: SummaryReport,
    pub preferences: ReconcileReport,
}

impl RunReport {
    /// True when every write landed and every customer was reconciled.
    pub fn is_success(&self) -> bool {
        self.summary.is_success() && self.preferences.is_success()
    }
}

pub struct Pipeline {
    reader: OrderReader,
    aggregator: SummaryAggregator,
    reconciler: PreferenceReconciler,
}

impl Pipeline {
    pub fn new(session: &Session, config: &ReconcileConfig) -> Self {
        Self {
            reader: OrderReader::new(session),
            aggregator: SummaryAggregator::new(session),
            reconciler: PreferenceReconciler::new(session, config.workers),
        }
    }

    /// Aggregate `date`, then reconcile the customers in `scope`.
    ///
    /// A failed date scan aborts the run before any write. Write failures
    /// and per-customer failures are collected into the report.
    pub async fn run(&self, date: NaiveDate, scope: ReconcileScope) -> Result<RunReport> {
        info!(date = %date, scope = scope.as_str(), "Starting rollup");

        let summary = self.aggregator.run(date).await?;

        let customers = match scope {
            ReconcileScope::Incremental => {
                let touched: Vec<Result<String>> =
                    summary.customers.iter().cloned().map(Ok).collect();
                stream::iter(touched).boxed()
            }
            ReconcileScope::Full => self.reader.customers(),
        };
        let preferences = self.reconciler.reconcile(customers).await;

        let report = RunReport {
            date,
            scope,
            summary,
            preferences,
        };

        info!(
            date = %date,
            success = report.is_success(),
            summary_failures = report.summary.failures.len(),
            preference_failures = report.preferences.failures.len(),
            "Rollup finished"
        );

        Ok(report)
    }
}
