//! PreferenceIndex trait definition.

use async_trait::async_trait;

use super::{Page, Result};
use crate::model::{Category, PreferenceRow};

/// Interface for the inverted customer preference index.
///
/// Partitioned by category and clustered by customer id, so "who prefers
/// X" is a single-partition scan while "what does customer Y prefer" takes
/// one point lookup per category.
///
/// Implementations:
/// - `SqlitePreferenceIndex`: SQLite storage
/// - `MemoryPreferenceIndex`: In-memory storage with failure injection for tests
#[async_trait]
pub trait PreferenceIndex: Send + Sync {
    /// Point lookup of `(category, customer_id)`.
    async fn contains(&self, category: Category, customer_id: &str) -> Result<bool>;

    /// Insert the row. Inserting an existing row is a no-op.
    async fn insert(&self, row: &PreferenceRow) -> Result<()>;

    /// Delete `(category, customer_id)`. Deleting a missing row is a no-op.
    async fn delete(&self, category: Category, customer_id: &str) -> Result<()>;

    /// Customers in the `category` partition in ascending order, starting
    /// strictly after `after` when given.
    async fn list_by_category(
        &self,
        category: Category,
        after: Option<&str>,
        limit: usize,
    ) -> Result<Page<String, String>>;
}
