//! PreferenceIndex interface tests.
//!
//! These tests verify the contract of the PreferenceIndex trait.
//! Each storage implementation should run these tests.

use menu_rollup::model::{Category, PreferenceRow};
use menu_rollup::storage::PreferenceIndex;

async fn drain_category<S: PreferenceIndex>(
    store: &S,
    category: Category,
    limit: usize,
) -> Vec<String> {
    let mut customers = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
        let page = store
            .list_by_category(category, cursor.as_deref(), limit)
            .await
            .expect("list_by_category should succeed");
        customers.extend(page.rows);
        match page.next {
            Some(next) => cursor = Some(next),
            None => return customers,
        }
    }
}

// =============================================================================
// PreferenceIndex::contains / insert tests
// =============================================================================

pub async fn test_contains_missing_row<S: PreferenceIndex>(store: &S) {
    let found = store
        .contains(Category::Washoku, "pi_nobody")
        .await
        .expect("contains should succeed");
    assert!(!found);
}

pub async fn test_insert_then_contains<S: PreferenceIndex>(store: &S) {
    store
        .insert(&PreferenceRow::new(Category::Yoshoku, "pi_insert"))
        .await
        .expect("insert should succeed");

    assert!(store.contains(Category::Yoshoku, "pi_insert").await.unwrap());
    assert!(
        !store.contains(Category::Washoku, "pi_insert").await.unwrap(),
        "row is keyed by category"
    );
}

pub async fn test_insert_is_idempotent<S: PreferenceIndex>(store: &S) {
    let row = PreferenceRow::new(Category::Washoku, "pi_twice");
    store.insert(&row).await.unwrap();
    store.insert(&row).await.expect("second insert should succeed");

    let customers = drain_category(store, Category::Washoku, 100).await;
    assert_eq!(customers.iter().filter(|c| *c == "pi_twice").count(), 1);
}

// =============================================================================
// PreferenceIndex::delete tests
// =============================================================================

pub async fn test_delete_removes_only_that_key<S: PreferenceIndex>(store: &S) {
    store
        .insert(&PreferenceRow::new(Category::Washoku, "pi_delete"))
        .await
        .unwrap();
    store
        .insert(&PreferenceRow::new(Category::Yoshoku, "pi_delete"))
        .await
        .unwrap();

    store
        .delete(Category::Washoku, "pi_delete")
        .await
        .expect("delete should succeed");

    assert!(!store.contains(Category::Washoku, "pi_delete").await.unwrap());
    assert!(store.contains(Category::Yoshoku, "pi_delete").await.unwrap());
}

pub async fn test_delete_missing_row_succeeds<S: PreferenceIndex>(store: &S) {
    store
        .delete(Category::Yoshoku, "pi_never_inserted")
        .await
        .expect("delete of a missing key should succeed");
}

// =============================================================================
// PreferenceIndex::list_by_category tests
// =============================================================================

pub async fn test_list_pages_in_customer_order<S: PreferenceIndex>(store: &S) {
    for id in ["pi_list_d", "pi_list_a", "pi_list_c", "pi_list_b", "pi_list_e"] {
        store
            .insert(&PreferenceRow::new(Category::Washoku, id))
            .await
            .unwrap();
    }
    store
        .insert(&PreferenceRow::new(Category::Yoshoku, "pi_list_z"))
        .await
        .unwrap();

    let customers = drain_category(store, Category::Washoku, 2).await;

    assert!(customers.windows(2).all(|w| w[0] < w[1]));
    let ours: Vec<&str> = customers
        .iter()
        .map(String::as_str)
        .filter(|c| c.starts_with("pi_list_"))
        .collect();
    assert_eq!(
        ours,
        vec!["pi_list_a", "pi_list_b", "pi_list_c", "pi_list_d", "pi_list_e"]
    );
}

// =============================================================================
// Test runner macro
// =============================================================================

/// Run all PreferenceIndex interface tests against a store implementation.
#[macro_export]
macro_rules! run_preference_index_tests {
    ($store:expr) => {
        use $crate::storage::preference_index_tests::*;

        // contains / insert tests
        test_contains_missing_row($store).await;
        println!("  test_contains_missing_row: PASSED");

        test_insert_then_contains($store).await;
        println!("  test_insert_then_contains: PASSED");

        test_insert_is_idempotent($store).await;
        println!("  test_insert_is_idempotent: PASSED");

        // delete tests
        test_delete_removes_only_that_key($store).await;
        println!("  test_delete_removes_only_that_key: PASSED");

        test_delete_missing_row_succeeds($store).await;
        println!("  test_delete_missing_row_succeeds: PASSED");

        // list_by_category tests
        test_list_pages_in_customer_order($store).await;
        println!("  test_list_pages_in_customer_order: PASSED");
    };
}
