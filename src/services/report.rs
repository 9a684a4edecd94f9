//! Read-side queries over the derived tables.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use futures::stream::BoxStream;
use futures::TryStreamExt;
use serde::Serialize;

use crate::error::{Result, RollupError};
use crate::model::{Category, SummaryRow};
use crate::services::reader::paginate;
use crate::storage::helpers::within;
use crate::storage::{PreferenceIndex, Session, SummaryStore};

/// Summary rows for one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyReport {
    pub date: NaiveDate,
    pub summaries: Vec<SummaryRow>,
}

/// Customers currently classified under one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub segment: Category,
    pub count: usize,
    pub customers: Vec<String>,
}

pub struct ReportQueries {
    summaries: Arc<dyn SummaryStore>,
    preferences: Arc<dyn PreferenceIndex>,
    page_size: usize,
    timeout: Duration,
}

impl ReportQueries {
    pub fn new(session: &Session) -> Self {
        Self {
            summaries: Arc::clone(&session.summaries),
            preferences: Arc::clone(&session.preferences),
            page_size: session.page_size(),
            timeout: session.timeout(),
        }
    }

    /// Stored summary rows for `date`. Empty if the date was never aggregated.
    pub async fn daily_summary(&self, date: NaiveDate) -> Result<DailyReport> {
        let summaries = within(self.timeout, "get_summaries", self.summaries.get_for_date(date))
            .await
            .map_err(RollupError::Read)?;
        Ok(DailyReport { date, summaries })
    }

    /// Page through every customer indexed under `category`.
    pub fn customers_preferring(&self, category: Category) -> BoxStream<'static, Result<String>> {
        let index = Arc::clone(&self.preferences);
        let limit = self.page_size;
        paginate(
            "list_preferences",
            self.timeout,
            None,
            move |after: Option<String>| {
                let index = Arc::clone(&index);
                async move { index.list_by_category(category, after.as_deref(), limit).await }
            },
        )
    }

    /// One segment per known category.
    pub async fn segments(&self) -> Result<Vec<Segment>> {
        let mut segments = Vec::with_capacity(Category::ALL.len());
        for category in Category::ALL {
            let customers: Vec<String> = self.customers_preferring(category).try_collect().await?;
            segments.push(Segment {
                segment: category,
                count: customers.len(),
                customers,
            });
        }
        Ok(segments)
    }
}
