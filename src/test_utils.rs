//! Test utilities shared by the unit tests.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};

use crate::model::{Category, OrderEvent};
use crate::storage::{MemoryOrderLog, MemoryPreferenceIndex, MemorySummaryStore, OrderLog, Session};

/// Build an order from an RFC 3339 timestamp.
pub fn order(customer: &str, rfc3339: &str, category: Category) -> OrderEvent {
    let ts: DateTime<Utc> = DateTime::parse_from_rfc3339(rfc3339)
        .unwrap()
        .with_timezone(&Utc);
    OrderEvent::new(customer, ts, category)
}

/// Parse a `YYYY-MM-DD` date.
pub fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
}

/// In-memory stores with the handles kept for inspection and failure injection.
pub struct MemoryStores {
    pub orders: Arc<MemoryOrderLog>,
    pub summaries: Arc<MemorySummaryStore>,
    pub preferences: Arc<MemoryPreferenceIndex>,
}

impl MemoryStores {
    pub fn new() -> Self {
        Self {
            orders: Arc::new(MemoryOrderLog::new()),
            summaries: Arc::new(MemorySummaryStore::new()),
            preferences: Arc::new(MemoryPreferenceIndex::new()),
        }
    }

    /// Stores pre-loaded with `orders`.
    pub async fn with_orders(orders: &[OrderEvent]) -> Self {
        let stores = Self::new();
        for o in orders {
            stores.orders.append(o).await.unwrap();
        }
        stores
    }

    /// A session over these stores with small pages and a short deadline.
    pub fn session(&self, page_size: usize) -> Session {
        Session::in_memory(
            Arc::clone(&self.orders),
            Arc::clone(&self.summaries),
            Arc::clone(&self.preferences),
        )
        .with_limits(page_size, Duration::from_secs(1))
    }
}
