//! In-memory SummaryStore implementation.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use super::injected;
use crate::model::{Category, SummaryRow};
use crate::storage::{Result, SummaryStore};

/// In-memory daily summary table.
#[derive(Default)]
pub struct MemorySummaryStore {
    rows: RwLock<BTreeMap<(NaiveDate, Category), u64>>,
    fail_upsert_for: RwLock<HashSet<Category>>,
    write_delay: RwLock<Option<Duration>>,
    upserts: AtomicUsize,
}

impl MemorySummaryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every upsert of a row for `category`.
    pub async fn fail_upsert_for(&self, category: Category) {
        self.fail_upsert_for.write().await.insert(category);
    }

    /// Sleep before every upsert.
    pub async fn set_write_delay(&self, delay: Option<Duration>) {
        *self.write_delay.write().await = delay;
    }

    pub async fn clear_failures(&self) {
        self.fail_upsert_for.write().await.clear();
        *self.write_delay.write().await = None;
    }

    /// Number of successful upserts.
    pub fn upserts(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }

    /// Every stored row, across all dates.
    pub async fn all_rows(&self) -> Vec<SummaryRow> {
        self.rows
            .read()
            .await
            .iter()
            .map(|((order_date, category), count)| SummaryRow {
                order_date: *order_date,
                category: *category,
                count: *count,
            })
            .collect()
    }
}

#[async_trait]
impl SummaryStore for MemorySummaryStore {
    async fn upsert(&self, row: &SummaryRow) -> Result<()> {
        if let Some(delay) = *self.write_delay.read().await {
            tokio::time::sleep(delay).await;
        }
        if self.fail_upsert_for.read().await.contains(&row.category) {
            return Err(injected("upsert"));
        }
        self.rows
            .write()
            .await
            .insert((row.order_date, row.category), row.count);
        self.upserts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get_for_date(&self, date: NaiveDate) -> Result<Vec<SummaryRow>> {
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .filter(|((d, _), _)| *d == date)
            .map(|((order_date, category), count)| SummaryRow {
                order_date: *order_date,
                category: *category,
                count: *count,
            })
            .collect())
    }
}
