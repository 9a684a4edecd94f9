//! Shared utilities for integration tests.

#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, Utc};

use menu_rollup::model::{Category, OrderEvent};

/// Build an order from an RFC 3339 timestamp.
pub fn order(customer: &str, rfc3339: &str, category: Category) -> OrderEvent {
    let ts: DateTime<Utc> = DateTime::parse_from_rfc3339(rfc3339)
        .expect("valid RFC 3339 timestamp")
        .with_timezone(&Utc);
    OrderEvent::new(customer, ts, category)
}

/// Parse a `YYYY-MM-DD` date.
pub fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("valid date")
}
