//! SQLite implementations of storage interfaces.
//!
//! All three stores share one `SqlitePool`. Queries are built with
//! sea-query and bound through sea-query-binder; pagination is keyset-based
//! on each table's primary key, never OFFSET.

mod order_log;
mod preference_index;
mod summary_store;


pub use order_log::SqliteOrderLog;
pub use preference_index::SqlitePreferenceIndex;
pub use summary_store::SqliteSummaryStore;

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use crate::storage::Result;

/// Path value selecting a private in-memory database.
pub const IN_MEMORY_PATH: &str = ":memory:";

/// Open a pool for the database at `path`, creating the file if missing.
///
/// An in-memory database lives inside a single connection, so for
/// [`IN_MEMORY_PATH`] the pool holds exactly one connection that is never
/// reaped or recycled.
pub async fn open_pool(path: &str) -> Result<SqlitePool> {
    if path == IN_MEMORY_PATH {
        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        return Ok(pool);
    }

    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", path)).await?;
    Ok(pool)
}

/// Create every table used by the rollup.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    SqliteOrderLog::new(pool.clone()).init().await?;
    SqliteSummaryStore::new(pool.clone()).init().await?;
    SqlitePreferenceIndex::new(pool.clone()).init().await?;
    Ok(())
}
