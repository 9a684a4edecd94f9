//! In-memory OrderLog implementation.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;

use super::injected;
use crate::model::OrderEvent;
use crate::storage::{OrderCursor, OrderLog, Page, Result};

type CustomerKey = (String, DateTime<Utc>);
type DateKey = (NaiveDate, String, DateTime<Utc>);

/// Primary rows plus the date-partitioned key path.
#[derive(Default)]
struct Tables {
    by_customer: BTreeMap<CustomerKey, OrderEvent>,
    by_date: BTreeMap<DateKey, OrderEvent>,
}

/// In-memory order log.
#[derive(Default)]
pub struct MemoryOrderLog {
    tables: RwLock<Tables>,
    scan_budget: RwLock<Option<usize>>,
    scan_delay: RwLock<Option<Duration>>,
    pages_served: AtomicUsize,
}

impl MemoryOrderLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Let the next `pages` page fetches succeed, then fail every scan.
    pub async fn fail_scans_after(&self, pages: usize) {
        *self.scan_budget.write().await = Some(pages);
    }

    pub async fn clear_scan_failure(&self) {
        *self.scan_budget.write().await = None;
    }

    /// Delay every page fetch, for deadline tests.
    pub async fn set_scan_delay(&self, delay: Option<Duration>) {
        *self.scan_delay.write().await = delay;
    }

    /// Number of pages returned so far across all scans.
    pub fn pages_served(&self) -> usize {
        self.pages_served.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.tables.read().await.by_customer.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn begin_scan(&self, operation: &str) -> Result<()> {
        if let Some(delay) = *self.scan_delay.read().await {
            tokio::time::sleep(delay).await;
        }

        let mut budget = self.scan_budget.write().await;
        if let Some(remaining) = budget.as_mut() {
            if *remaining == 0 {
                return Err(injected(operation));
            }
            *remaining -= 1;
        }

        self.pages_served.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl OrderLog for MemoryOrderLog {
    async fn append(&self, order: &OrderEvent) -> Result<()> {
        let mut tables = self.tables.write().await;
        let key = (order.customer_id.clone(), order.timestamp);

        if let Some(previous) = tables.by_customer.insert(key, order.clone()) {
            tables
                .by_date
                .remove(&(previous.order_date, previous.customer_id, previous.timestamp));
        }
        tables.by_date.insert(
            (order.order_date, order.customer_id.clone(), order.timestamp),
            order.clone(),
        );
        Ok(())
    }

    async fn scan_by_date(
        &self,
        date: NaiveDate,
        after: Option<&OrderCursor>,
        limit: usize,
    ) -> Result<Page<OrderEvent, OrderCursor>> {
        self.begin_scan("scan_by_date").await?;

        let start = match after {
            Some(cursor) => Bound::Excluded((date, cursor.customer_id.clone(), cursor.timestamp)),
            None => Bound::Included((date, String::new(), DateTime::<Utc>::MIN_UTC)),
        };

        let tables = self.tables.read().await;
        let rows: Vec<OrderEvent> = tables
            .by_date
            .range((start, Bound::Unbounded))
            .take_while(|((d, _, _), _)| *d == date)
            .take(limit)
            .map(|(_, order)| order.clone())
            .collect();

        Ok(Page::from_rows(rows, limit, OrderCursor::after))
    }

    async fn scan_by_customer(
        &self,
        customer_id: &str,
        after: Option<&OrderCursor>,
        limit: usize,
    ) -> Result<Page<OrderEvent, OrderCursor>> {
        self.begin_scan("scan_by_customer").await?;

        let start = match after {
            Some(cursor) => Bound::Excluded((customer_id.to_string(), cursor.timestamp)),
            None => Bound::Included((customer_id.to_string(), DateTime::<Utc>::MIN_UTC)),
        };

        let tables = self.tables.read().await;
        let rows: Vec<OrderEvent> = tables
            .by_customer
            .range((start, Bound::Unbounded))
            .take_while(|((c, _), _)| c == customer_id)
            .take(limit)
            .map(|(_, order)| order.clone())
            .collect();

        Ok(Page::from_rows(rows, limit, OrderCursor::after))
    }

    async fn list_customers(&self, after: Option<&str>, limit: usize) -> Result<Page<String, String>> {
        self.begin_scan("list_customers").await?;

        let start = match after {
            Some(after) => Bound::Excluded((after.to_string(), DateTime::<Utc>::MAX_UTC)),
            None => Bound::Unbounded,
        };

        let tables = self.tables.read().await;
        let mut customers: Vec<String> = Vec::new();
        for ((customer, _), _) in tables.by_customer.range((start, Bound::Unbounded)) {
            if customers.last() == Some(customer) {
                continue;
            }
            if customers.len() == limit {
                break;
            }
            customers.push(customer.clone());
        }

        Ok(Page::from_rows(customers, limit, String::clone))
    }
}
