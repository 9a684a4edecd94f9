//! OrderLog trait definition.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use super::{Page, Result};
use crate::model::OrderEvent;

/// Keyset position inside an order scan.
///
/// Orders are clustered by `(customer_id, timestamp)` inside both the date
/// partition and the customer partition, so the pair identifies the last
/// row returned and the next page starts strictly after it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct OrderCursor {
    pub customer_id: String,
    pub timestamp: DateTime<Utc>,
}

impl OrderCursor {
    pub fn after(order: &OrderEvent) -> Self {
        Self {
            customer_id: order.customer_id.clone(),
            timestamp: order.timestamp,
        }
    }
}

/// Interface to the append-only raw order log.
///
/// Every read is restricted to a single partition (a date or a customer)
/// or walks partition keys, and returns at most `limit` rows per call.
///
/// Implementations:
/// - `SqliteOrderLog`: SQLite storage
/// - `MemoryOrderLog`: In-memory storage with failure injection for tests
#[async_trait]
pub trait OrderLog: Send + Sync {
    /// Append an order. Re-appending the same `(customer_id, timestamp)`
    /// overwrites the row (last write wins).
    async fn append(&self, order: &OrderEvent) -> Result<()>;

    /// Orders placed on `date`, ordered by `(customer_id, timestamp)`,
    /// starting strictly after `after` when given.
    async fn scan_by_date(
        &self,
        date: NaiveDate,
        after: Option<&OrderCursor>,
        limit: usize,
    ) -> Result<Page<OrderEvent, OrderCursor>>;

    /// A customer's full order history, ordered by timestamp, starting
    /// strictly after `after` when given.
    async fn scan_by_customer(
        &self,
        customer_id: &str,
        after: Option<&OrderCursor>,
        limit: usize,
    ) -> Result<Page<OrderEvent, OrderCursor>>;

    /// Distinct customer partition keys in ascending order, starting
    /// strictly after `after` when given.
    async fn list_customers(&self, after: Option<&str>, limit: usize) -> Result<Page<String, String>>;
}
