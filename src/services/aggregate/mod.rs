//! Daily summary aggregation.
//!
//! One pass over a date partition counts orders per category. Every known
//! category then gets its row upserted by full key `(order_date, category)`,
//! so re-running a date overwrites the previous result instead of adding
//! to it. Stored summaries are never read back as input.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use futures::{Stream, TryStreamExt};
use tracing::{debug, error, info};

use crate::error::{Result, RollupError};
use crate::model::{Category, CategoryCounts, OrderEvent, SummaryRow};
use crate::services::reader::OrderReader;
use crate::storage::helpers::within;
use crate::storage::{Session, SummaryStore};

/// Counts accumulated from one date partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub counts: CategoryCounts,
    /// Distinct customers with at least one order on `date`.
    pub customers: BTreeSet<String>,
}

impl DailySummary {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            counts: CategoryCounts::new(),
            customers: BTreeSet::new(),
        }
    }

    pub fn record(&mut self, order: &OrderEvent) {
        self.counts.record(order.category);
        if !self.customers.contains(&order.customer_id) {
            self.customers.insert(order.customer_id.clone());
        }
    }

    /// Total orders counted.
    pub fn orders(&self) -> u64 {
        self.counts.total()
    }

    /// One row per known category, zero counts included.
    pub fn rows(&self) -> Vec<SummaryRow> {
        self.counts
            .iter()
            .map(|(category, count)| SummaryRow {
                order_date: self.date,
                category,
                count,
            })
            .collect()
    }
}

/// Fold a stream of orders into a [`DailySummary`].
///
/// The first error from the stream is returned and nothing is kept.
pub async fn tally<S>(date: NaiveDate, orders: S) -> Result<DailySummary>
where
    S: Stream<Item = Result<OrderEvent>>,
{
    orders
        .try_fold(DailySummary::new(date), |mut summary, order| async move {
            summary.record(&order);
            Ok(summary)
        })
        .await
}

/// Outcome of aggregating one date.
#[derive(Debug)]
pub struct SummaryReport {
    pub date: NaiveDate,
    /// Every row the run attempted to write.
    pub rows: Vec<SummaryRow>,
    /// Customers seen on the date.
    pub customers: BTreeSet<String>,
    /// Categories whose upsert failed.
    pub failures: Vec<(Category, RollupError)>,
}

impl SummaryReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Builds and persists the daily summary rows.
pub struct SummaryAggregator {
    reader: OrderReader,
    store: Arc<dyn SummaryStore>,
    timeout: Duration,
}

impl SummaryAggregator {
    pub fn new(session: &Session) -> Self {
        Self {
            reader: OrderReader::new(session),
            store: Arc::clone(&session.summaries),
            timeout: session.timeout(),
        }
    }

    /// Scan the date partition and count it.
    pub async fn tally(&self, date: NaiveDate) -> Result<DailySummary> {
        let summary = tally(date, self.reader.by_date(date)).await?;
        debug!(
            date = %date,
            orders = summary.orders(),
            customers = summary.customers.len(),
            "Date partition scanned"
        );
        Ok(summary)
    }

    /// Upsert every row of `summary`, continuing past failed categories.
    pub async fn persist(&self, summary: &DailySummary) -> Vec<(Category, RollupError)> {
        let mut failures = Vec::new();

        for row in summary.rows() {
            match within(self.timeout, "upsert_summary", self.store.upsert(&row)).await {
                Ok(()) => {
                    debug!(
                        date = %row.order_date,
                        category = %row.category,
                        count = row.count,
                        "Summary row upserted"
                    );
                }
                Err(e) => {
                    error!(
                        date = %row.order_date,
                        category = %row.category,
                        error = %e,
                        "Failed to upsert summary row"
                    );
                    failures.push((row.category, RollupError::Write(e)));
                }
            }
        }

        failures
    }

    /// Count the date and write its rows.
    ///
    /// A failed scan writes nothing and is returned as the error. Upsert
    /// failures are reported per category in the [`SummaryReport`].
    pub async fn run(&self, date: NaiveDate) -> Result<SummaryReport> {
        let summary = self.tally(date).await.inspect_err(|e| {
            error!(date = %date, error = %e, "Date scan failed, no summary rows written");
        })?;

        let failures = self.persist(&summary).await;

        info!(
            date = %date,
            orders = summary.orders(),
            categories = Category::ALL.len(),
            failed = failures.len(),
            "Daily summary aggregated"
        );

        Ok(SummaryReport {
            date,
            rows: summary.rows(),
            customers: summary.customers,
            failures,
        })
    }
}
