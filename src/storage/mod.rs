//! Storage interfaces and implementations.
//!
//! The store is modelled as a wide-column database: every read is bounded by
//! a partition or clustering key and paginated with a keyset cursor, writes
//! are single-row and atomic per row only. There is no server-side
//! aggregation and no cross-row transaction.
//!
//! Three tables are addressed:
//! - `raw_orders`: append-only order log, key `(customer_id, timestamp)`,
//!   with a date-partitioned path `(order_date, customer_id, timestamp)`
//! - `daily_order_summaries`: key `(order_date, category)`
//! - `customer_preferences`: inverted index, key `(category, customer_id)`

use std::time::Duration;

pub mod helpers;
pub mod memory;
mod order_log;
mod preference_index;
mod session;
mod summary_store;

#[cfg(feature = "sqlite")]
pub mod schema;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use memory::{MemoryOrderLog, MemoryPreferenceIndex, MemorySummaryStore};
pub use order_log::{OrderCursor, OrderLog};
pub use preference_index::PreferenceIndex;
pub use session::{connect, Session};
pub use summary_store::SummaryStore;

#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteOrderLog, SqlitePreferenceIndex, SqliteSummaryStore};

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[cfg(feature = "sqlite")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Malformed row in {table}: {reason}")]
    MalformedRow { table: &'static str, reason: String },

    #[error("Storage operation '{operation}' timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Storage backend '{0}' is not enabled in this build")]
    BackendDisabled(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One page of a key-bounded scan.
///
/// `next` is the cursor to resume after the last row of this page, or
/// `None` once the scan is exhausted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T, C> {
    pub rows: Vec<T>,
    pub next: Option<C>,
}

impl<T, C> Page<T, C> {
    /// Build a page, emitting a resume cursor only when the page is full.
    pub fn from_rows(rows: Vec<T>, limit: usize, cursor_of: impl Fn(&T) -> C) -> Self {
        let next = if limit > 0 && rows.len() >= limit {
            rows.last().map(cursor_of)
        } else {
            None
        };
        Self { rows, next }
    }

    /// An exhausted page with no rows.
    pub fn empty() -> Self {
        Self {
            rows: Vec::new(),
            next: None,
        }
    }
}
