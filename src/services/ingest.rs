//! Order log ingestion.
//!
//! Reads order lines of the form `customer_id,timestamp,category`, where
//! `timestamp` is RFC 3339 and `category` is a lowercase category name,
//! and appends them to the raw order log. The date partition of each order
//! is the UTC date of its timestamp.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};

use crate::error::{Result, RollupError};
use crate::model::{Category, OrderEvent};
use crate::storage::helpers::within;
use crate::storage::Session;

/// Parse one order line.
pub fn parse_line(line: &str) -> Result<OrderEvent> {
    let fields: Vec<&str> = line.trim().split(',').map(str::trim).collect();
    let [customer_id, timestamp, category] = fields.as_slice() else {
        return Err(RollupError::InvalidInput(format!(
            "expected 3 comma-separated fields, got {}",
            fields.len()
        )));
    };

    if customer_id.is_empty() {
        return Err(RollupError::InvalidInput("empty customer id".to_string()));
    }

    let timestamp: DateTime<Utc> = DateTime::parse_from_rfc3339(timestamp)
        .map_err(|e| RollupError::InvalidInput(format!("invalid timestamp {timestamp:?}: {e}")))?
        .with_timezone(&Utc);
    if timestamp.timestamp_subsec_nanos() % 1_000 != 0 {
        return Err(RollupError::InvalidInput(format!(
            "timestamp {timestamp} is finer than microsecond precision"
        )));
    }

    let category: Category = category
        .parse()
        .map_err(|e| RollupError::InvalidInput(format!("{e}")))?;

    Ok(OrderEvent::new(*customer_id, timestamp, category))
}

/// Outcome of an ingestion run.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub appended: usize,
    /// Lines that could not be parsed, by 1-based line number.
    pub rejected: Vec<(usize, RollupError)>,
    /// Parsed orders the store refused, by 1-based line number.
    pub failed: Vec<(usize, RollupError)>,
}

impl IngestReport {
    pub fn is_success(&self) -> bool {
        self.rejected.is_empty() && self.failed.is_empty()
    }
}

/// Append every order line from `input`. Blank lines are ignored.
///
/// Bad lines and failed appends are recorded and skipped; only a failure
/// to read `input` itself is returned as an error.
pub async fn ingest_lines<R>(session: &Session, input: R) -> Result<IngestReport>
where
    R: AsyncBufRead + Unpin,
{
    let log = Arc::clone(&session.orders);
    let mut lines = input.lines();
    let mut report = IngestReport::default();
    let mut line_no = 0;

    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| RollupError::InvalidInput(format!("reading input: {e}")))?
    {
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }

        let order = match parse_line(&line) {
            Ok(order) => order,
            Err(e) => {
                warn!(line = line_no, error = %e, "Rejected order line");
                report.rejected.push((line_no, e));
                continue;
            }
        };

        match within(session.timeout(), "append_order", log.append(&order)).await {
            Ok(()) => {
                debug!(customer = %order.customer_id, date = %order.order_date, "Order appended");
                report.appended += 1;
            }
            Err(e) => {
                warn!(line = line_no, error = %e, "Failed to append order");
                report.failed.push((line_no, RollupError::Write(e)));
            }
        }
    }

    info!(
        appended = report.appended,
        rejected = report.rejected.len(),
        failed = report.failed.len(),
        "Ingestion finished"
    );

    Ok(report)
}
