//! SummaryStore interface tests.
//!
//! These tests verify the contract of the SummaryStore trait.
//! Each storage implementation should run these tests.

use menu_rollup::model::{Category, SummaryRow};
use menu_rollup::storage::SummaryStore;

use crate::common::date;

fn row(day: &str, category: Category, count: u64) -> SummaryRow {
    SummaryRow {
        order_date: date(day),
        category,
        count,
    }
}

// =============================================================================
// SummaryStore::get_for_date tests
// =============================================================================

pub async fn test_get_unknown_date_is_empty<S: SummaryStore>(store: &S) {
    let rows = store
        .get_for_date(date("1999-12-31"))
        .await
        .expect("get_for_date should succeed");
    assert!(rows.is_empty());
}

// =============================================================================
// SummaryStore::upsert tests
// =============================================================================

pub async fn test_upsert_and_get<S: SummaryStore>(store: &S) {
    store
        .upsert(&row("2011-01-01", Category::Washoku, 4))
        .await
        .expect("upsert should succeed");
    store
        .upsert(&row("2011-01-01", Category::Yoshoku, 0))
        .await
        .expect("upsert should succeed");

    let mut rows = store.get_for_date(date("2011-01-01")).await.unwrap();
    rows.sort_by_key(|r| r.category);

    assert_eq!(
        rows,
        vec![
            row("2011-01-01", Category::Washoku, 4),
            row("2011-01-01", Category::Yoshoku, 0),
        ]
    );
}

pub async fn test_upsert_overwrites_count<S: SummaryStore>(store: &S) {
    store
        .upsert(&row("2012-02-02", Category::Washoku, 10))
        .await
        .unwrap();
    store
        .upsert(&row("2012-02-02", Category::Washoku, 3))
        .await
        .unwrap();

    let rows = store.get_for_date(date("2012-02-02")).await.unwrap();
    assert_eq!(rows, vec![row("2012-02-02", Category::Washoku, 3)]);
}

pub async fn test_dates_are_isolated<S: SummaryStore>(store: &S) {
    store
        .upsert(&row("2013-03-03", Category::Yoshoku, 1))
        .await
        .unwrap();
    store
        .upsert(&row("2013-03-04", Category::Yoshoku, 2))
        .await
        .unwrap();

    let rows = store.get_for_date(date("2013-03-03")).await.unwrap();
    assert_eq!(rows, vec![row("2013-03-03", Category::Yoshoku, 1)]);
}

// =============================================================================
// Test runner macro
// =============================================================================

/// Run all SummaryStore interface tests against a store implementation.
#[macro_export]
macro_rules! run_summary_store_tests {
    ($store:expr) => {
        use $crate::storage::summary_store_tests::*;

        test_get_unknown_date_is_empty($store).await;
        println!("  test_get_unknown_date_is_empty: PASSED");

        test_upsert_and_get($store).await;
        println!("  test_upsert_and_get: PASSED");

        test_upsert_overwrites_count($store).await;
        println!("  test_upsert_overwrites_count: PASSED");

        test_dates_are_isolated($store).await;
        println!("  test_dates_are_isolated: PASSED");
    };
}
