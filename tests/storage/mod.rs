//! Shared storage integration tests.
//!
//! Tests the OrderLog, SummaryStore and PreferenceIndex interfaces against
//! all implementations. Each implementation module imports these test
//! functions and runs them against one store instance, so every test keys
//! its rows by ids no other test uses.

pub mod order_log_tests;
pub mod preference_index_tests;
pub mod summary_store_tests;
