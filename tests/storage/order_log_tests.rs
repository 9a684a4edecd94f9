//! OrderLog interface tests.
//!
//! These tests verify the contract of the OrderLog trait.
//! Each storage implementation should run these tests.

use chrono::{DateTime, Utc};

use menu_rollup::model::{Category, OrderEvent};
use menu_rollup::storage::{OrderCursor, OrderLog};

use crate::common::{date, order};

async fn drain_date<S: OrderLog>(store: &S, day: &str, limit: usize) -> Vec<OrderEvent> {
    let mut rows = Vec::new();
    let mut cursor: Option<OrderCursor> = None;
    loop {
        let page = store
            .scan_by_date(date(day), cursor.as_ref(), limit)
            .await
            .expect("scan_by_date should succeed");
        assert!(page.rows.len() <= limit, "page must respect limit");
        rows.extend(page.rows);
        match page.next {
            Some(next) => cursor = Some(next),
            None => return rows,
        }
    }
}

async fn drain_customers<S: OrderLog>(store: &S, limit: usize) -> Vec<String> {
    let mut customers = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
        let page = store
            .list_customers(cursor.as_deref(), limit)
            .await
            .expect("list_customers should succeed");
        customers.extend(page.rows);
        match page.next {
            Some(next) => cursor = Some(next),
            None => return customers,
        }
    }
}

// =============================================================================
// OrderLog::scan_by_customer tests
// =============================================================================

pub async fn test_scan_unknown_customer_is_empty<S: OrderLog>(store: &S) {
    let page = store
        .scan_by_customer("ol_nobody", None, 10)
        .await
        .expect("scan should succeed");
    assert!(page.rows.is_empty());
    assert!(page.next.is_none());
}

pub async fn test_customer_history_in_timestamp_order<S: OrderLog>(store: &S) {
    let orders = [
        order("ol_hist", "2002-03-05T12:00:00Z", Category::Yoshoku),
        order("ol_hist", "2002-03-01T12:00:00Z", Category::Washoku),
        order("ol_hist", "2002-03-03T12:00:00Z", Category::Washoku),
    ];
    for o in &orders {
        store.append(o).await.expect("append should succeed");
    }

    let page = store
        .scan_by_customer("ol_hist", None, 10)
        .await
        .expect("scan should succeed");

    let stamps: Vec<DateTime<Utc>> = page.rows.iter().map(|o| o.timestamp).collect();
    assert_eq!(stamps.len(), 3);
    assert!(stamps.windows(2).all(|w| w[0] < w[1]), "ascending timestamps");
    assert_eq!(page.rows[0], orders[1]);
}

pub async fn test_customer_scan_paginates<S: OrderLog>(store: &S) {
    for day in 1..=5 {
        let ts = format!("2003-01-{day:02}T08:00:00Z");
        store
            .append(&order("ol_pages", &ts, Category::Washoku))
            .await
            .unwrap();
    }

    let first = store.scan_by_customer("ol_pages", None, 2).await.unwrap();
    assert_eq!(first.rows.len(), 2);
    let cursor = first.next.expect("full page carries a cursor");

    let second = store
        .scan_by_customer("ol_pages", Some(&cursor), 2)
        .await
        .unwrap();
    assert_eq!(second.rows.len(), 2);
    assert!(second.rows[0].timestamp > first.rows[1].timestamp);

    let third = store
        .scan_by_customer("ol_pages", second.next.as_ref(), 2)
        .await
        .unwrap();
    assert_eq!(third.rows.len(), 1);
    assert!(third.next.is_none(), "short page ends the scan");
}

// =============================================================================
// OrderLog::append tests
// =============================================================================

pub async fn test_append_same_key_is_idempotent<S: OrderLog>(store: &S) {
    let o = order("ol_dup", "2004-02-02T02:02:02Z", Category::Washoku);
    store.append(&o).await.unwrap();
    store.append(&o).await.unwrap();

    let page = store.scan_by_customer("ol_dup", None, 10).await.unwrap();
    assert_eq!(page.rows.len(), 1);
}

pub async fn test_microsecond_timestamps_are_distinct_keys<S: OrderLog>(store: &S) {
    store
        .append(&order("ol_micro", "2005-05-05T05:05:05.000001Z", Category::Washoku))
        .await
        .unwrap();
    store
        .append(&order("ol_micro", "2005-05-05T05:05:05.000002Z", Category::Yoshoku))
        .await
        .unwrap();

    let page = store.scan_by_customer("ol_micro", None, 10).await.unwrap();
    assert_eq!(page.rows.len(), 2);
    assert_eq!(page.rows[0].category, Category::Washoku);
    assert_eq!(page.rows[1].category, Category::Yoshoku);
}

// =============================================================================
// OrderLog::scan_by_date tests
// =============================================================================

pub async fn test_date_scan_is_bounded_to_date<S: OrderLog>(store: &S) {
    store
        .append(&order("ol_day_a", "2006-06-05T23:59:59Z", Category::Washoku))
        .await
        .unwrap();
    store
        .append(&order("ol_day_a", "2006-06-06T00:00:00Z", Category::Yoshoku))
        .await
        .unwrap();
    store
        .append(&order("ol_day_b", "2006-06-06T23:59:59.999999Z", Category::Washoku))
        .await
        .unwrap();
    store
        .append(&order("ol_day_b", "2006-06-07T00:00:00Z", Category::Washoku))
        .await
        .unwrap();

    let rows = drain_date(store, "2006-06-06", 10).await;

    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|o| o.order_date == date("2006-06-06")));
}

pub async fn test_date_scan_pages_cover_partition_once<S: OrderLog>(store: &S) {
    for (customer, hour) in [("ol_p3", 9), ("ol_p1", 8), ("ol_p2", 7), ("ol_p1", 10), ("ol_p2", 11)] {
        let ts = format!("2007-07-07T{hour:02}:00:00Z");
        store
            .append(&order(customer, &ts, Category::Yoshoku))
            .await
            .unwrap();
    }

    let paged = drain_date(store, "2007-07-07", 2).await;
    let whole = drain_date(store, "2007-07-07", 100).await;

    assert_eq!(paged.len(), 5);
    assert_eq!(paged, whole);
}

pub async fn test_date_scan_exact_page_ends_with_empty_page<S: OrderLog>(store: &S) {
    store
        .append(&order("ol_exact", "2008-08-08T08:00:00Z", Category::Washoku))
        .await
        .unwrap();
    store
        .append(&order("ol_exact", "2008-08-08T09:00:00Z", Category::Washoku))
        .await
        .unwrap();

    let first = store.scan_by_date(date("2008-08-08"), None, 2).await.unwrap();
    assert_eq!(first.rows.len(), 2);
    let cursor = first.next.expect("full page carries a cursor");

    let second = store
        .scan_by_date(date("2008-08-08"), Some(&cursor), 2)
        .await
        .unwrap();
    assert!(second.rows.is_empty());
    assert!(second.next.is_none());
}

// =============================================================================
// OrderLog::list_customers tests
// =============================================================================

pub async fn test_list_customers_distinct_and_sorted<S: OrderLog>(store: &S) {
    for (customer, day) in [("ol_lc_b", 1), ("ol_lc_a", 1), ("ol_lc_a", 2), ("ol_lc_c", 3)] {
        let ts = format!("2009-09-{day:02}T09:00:00Z");
        store
            .append(&order(customer, &ts, Category::Washoku))
            .await
            .unwrap();
    }

    let customers = drain_customers(store, 2).await;

    assert!(
        customers.windows(2).all(|w| w[0] < w[1]),
        "customers strictly ascending"
    );
    let ours: Vec<&str> = customers
        .iter()
        .map(String::as_str)
        .filter(|c| c.starts_with("ol_lc_"))
        .collect();
    assert_eq!(ours, vec!["ol_lc_a", "ol_lc_b", "ol_lc_c"]);
}

// =============================================================================
// Test runner macro
// =============================================================================

/// Run all OrderLog interface tests against a store implementation.
#[macro_export]
macro_rules! run_order_log_tests {
    ($store:expr) => {
        use $crate::storage::order_log_tests::*;

        // scan_by_customer tests
        test_scan_unknown_customer_is_empty($store).await;
        println!("  test_scan_unknown_customer_is_empty: PASSED");

        test_customer_history_in_timestamp_order($store).await;
        println!("  test_customer_history_in_timestamp_order: PASSED");

        test_customer_scan_paginates($store).await;
        println!("  test_customer_scan_paginates: PASSED");

        // append tests
        test_append_same_key_is_idempotent($store).await;
        println!("  test_append_same_key_is_idempotent: PASSED");

        test_microsecond_timestamps_are_distinct_keys($store).await;
        println!("  test_microsecond_timestamps_are_distinct_keys: PASSED");

        // scan_by_date tests
        test_date_scan_is_bounded_to_date($store).await;
        println!("  test_date_scan_is_bounded_to_date: PASSED");

        test_date_scan_pages_cover_partition_once($store).await;
        println!("  test_date_scan_pages_cover_partition_once: PASSED");

        test_date_scan_exact_page_ends_with_empty_page($store).await;
        println!("  test_date_scan_exact_page_ends_with_empty_page: PASSED");

        // list_customers tests
        test_list_customers_distinct_and_sorted($store).await;
        println!("  test_list_customers_distinct_and_sorted: PASSED");
    };
}
