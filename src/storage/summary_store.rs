//! SummaryStore trait definition.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::Result;
use crate::model::SummaryRow;

/// Interface for the daily summary table.
///
/// Rows are keyed by `(order_date, category)`. Writes replace the whole row;
/// the aggregation core never reads this table back as input.
///
/// Implementations:
/// - `SqliteSummaryStore`: SQLite storage
/// - `MemorySummaryStore`: In-memory storage with failure injection for tests
#[async_trait]
pub trait SummaryStore: Send + Sync {
    /// Insert or fully replace the row for `(row.order_date, row.category)`.
    async fn upsert(&self, row: &SummaryRow) -> Result<()>;

    /// All summary rows in the `date` partition, ordered by category.
    async fn get_for_date(&self, date: NaiveDate) -> Result<Vec<SummaryRow>>;
}
