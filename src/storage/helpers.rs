//! Shared storage helper functions.
//!
//! Deadline handling and the column encodings shared by the backends.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};

use super::{Result, StorageError};

/// Date column format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Run a storage call under a deadline.
///
/// An elapsed deadline becomes [`StorageError::Timeout`] naming `operation`.
pub async fn within<T, F>(timeout: Duration, operation: &'static str, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(StorageError::Timeout { operation, timeout }),
    }
}

/// Encode a timestamp as microseconds since the Unix epoch.
pub fn timestamp_to_micros(ts: &DateTime<Utc>) -> i64 {
    ts.timestamp_micros()
}

/// Decode a microsecond timestamp column.
pub fn micros_to_timestamp(table: &'static str, micros: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_micros(micros).ok_or_else(|| StorageError::MalformedRow {
        table,
        reason: format!("timestamp out of range: {micros}"),
    })
}

/// Encode a date column.
pub fn format_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Decode a date column.
pub fn parse_date(table: &'static str, raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| StorageError::MalformedRow {
        table,
        reason: format!("invalid date {raw:?}: {e}"),
    })
}

/// Decode a category column.
pub fn parse_category(table: &'static str, raw: &str) -> Result<crate::model::Category> {
    raw.parse().map_err(|e: crate::model::UnknownCategory| StorageError::MalformedRow {
        table,
        reason: e.to_string(),
    })
}
