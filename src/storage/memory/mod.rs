//! In-memory storage implementations.
//!
//! Emulate the key shapes of the persistent tables with ordered maps so
//! pagination and key-bounded scans behave like the SQLite backend. Each
//! store carries failure-injection hooks used by tests to reproduce read
//! failures, write failures between the two halves of a preference
//! transition, and slow store calls.

mod order_log;
mod preference_index;
mod summary_store;


pub use order_log::MemoryOrderLog;
pub use preference_index::MemoryPreferenceIndex;
pub use summary_store::MemorySummaryStore;

use super::StorageError;

fn injected(operation: &str) -> StorageError {
    StorageError::Unavailable(format!("injected failure in {operation}"))
}
