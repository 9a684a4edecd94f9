//! In-memory PreferenceIndex implementation.

use std::collections::{BTreeSet, HashSet};
use std::ops::Bound;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::injected;
use crate::model::{Category, PreferenceRow};
use crate::storage::{Page, PreferenceIndex, Result};

/// In-memory inverted preference index.
#[derive(Default)]
pub struct MemoryPreferenceIndex {
    rows: RwLock<BTreeSet<(Category, String)>>,
    fail_on_lookup: RwLock<bool>,
    fail_insert_for: RwLock<HashSet<String>>,
    fail_delete_for: RwLock<HashSet<String>>,
    write_delay: RwLock<Option<Duration>>,
    writes: AtomicUsize,
}

impl MemoryPreferenceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a row directly, without counting it as a write.
    pub async fn seed(&self, row: PreferenceRow) {
        self.rows.write().await.insert((row.category, row.customer_id));
    }

    pub async fn set_fail_on_lookup(&self, fail: bool) {
        *self.fail_on_lookup.write().await = fail;
    }

    /// Fail every insert for `customer_id`.
    pub async fn fail_insert_for(&self, customer_id: &str) {
        self.fail_insert_for
            .write()
            .await
            .insert(customer_id.to_string());
    }

    /// Fail every delete for `customer_id`.
    pub async fn fail_delete_for(&self, customer_id: &str) {
        self.fail_delete_for
            .write()
            .await
            .insert(customer_id.to_string());
    }

    /// Sleep before every insert and delete.
    pub async fn set_write_delay(&self, delay: Option<Duration>) {
        *self.write_delay.write().await = delay;
    }

    pub async fn clear_failures(&self) {
        *self.fail_on_lookup.write().await = false;
        self.fail_insert_for.write().await.clear();
        self.fail_delete_for.write().await.clear();
        *self.write_delay.write().await = None;
    }

    async fn delay_write(&self) {
        if let Some(delay) = *self.write_delay.read().await {
            tokio::time::sleep(delay).await;
        }
    }

    /// Number of successful inserts and deletes.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn reset_writes(&self) {
        self.writes.store(0, Ordering::SeqCst);
    }

    /// Every row, ordered by `(category, customer_id)`.
    pub async fn rows(&self) -> Vec<PreferenceRow> {
        self.rows
            .read()
            .await
            .iter()
            .map(|(category, customer_id)| PreferenceRow::new(*category, customer_id.clone()))
            .collect()
    }

    /// Categories currently holding a row for `customer_id`.
    pub async fn categories_for(&self, customer_id: &str) -> Vec<Category> {
        self.rows
            .read()
            .await
            .iter()
            .filter(|(_, c)| c == customer_id)
            .map(|(category, _)| *category)
            .collect()
    }
}

#[async_trait]
impl PreferenceIndex for MemoryPreferenceIndex {
    async fn contains(&self, category: Category, customer_id: &str) -> Result<bool> {
        if *self.fail_on_lookup.read().await {
            return Err(injected("contains"));
        }
        Ok(self
            .rows
            .read()
            .await
            .contains(&(category, customer_id.to_string())))
    }

    async fn insert(&self, row: &PreferenceRow) -> Result<()> {
        self.delay_write().await;
        if self.fail_insert_for.read().await.contains(&row.customer_id) {
            return Err(injected("insert"));
        }
        self.rows
            .write()
            .await
            .insert((row.category, row.customer_id.clone()));
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete(&self, category: Category, customer_id: &str) -> Result<()> {
        self.delay_write().await;
        if self.fail_delete_for.read().await.contains(customer_id) {
            return Err(injected("delete"));
        }
        self.rows
            .write()
            .await
            .remove(&(category, customer_id.to_string()));
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn list_by_category(
        &self,
        category: Category,
        after: Option<&str>,
        limit: usize,
    ) -> Result<Page<String, String>> {
        let start = match after {
            Some(after) => Bound::Excluded((category, after.to_string())),
            None => Bound::Included((category, String::new())),
        };

        let rows = self.rows.read().await;
        let customers: Vec<String> = rows
            .range((start, Bound::Unbounded))
            .take_while(|(c, _)| *c == category)
            .take(limit)
            .map(|(_, customer_id)| customer_id.clone())
            .collect();

        Ok(Page::from_rows(customers, limit, String::clone))
    }
}
