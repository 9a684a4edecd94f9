//! Event reader: lazy, paginated scans over the raw order log.
//!
//! Every stream issues one key-bounded page fetch at a time, so at most one
//! page of rows is held in memory. A failed fetch yields a single
//! [`RollupError::Read`] and ends the stream.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use tracing::debug;

use crate::error::{Result, RollupError};
use crate::model::OrderEvent;
use crate::storage::helpers::within;
use crate::storage::{self, OrderCursor, OrderLog, Page, Session};

/// Reader over the raw order log.
#[derive(Clone)]
pub struct OrderReader {
    log: Arc<dyn OrderLog>,
    page_size: usize,
    timeout: Duration,
}

impl OrderReader {
    pub fn new(session: &Session) -> Self {
        Self {
            log: Arc::clone(&session.orders),
            page_size: session.page_size(),
            timeout: session.timeout(),
        }
    }

    /// Every order placed on `date`.
    pub fn by_date(&self, date: NaiveDate) -> BoxStream<'static, Result<OrderEvent>> {
        self.resume_by_date(date, None)
    }

    /// Orders placed on `date`, continuing strictly after `cursor`.
    pub fn resume_by_date(
        &self,
        date: NaiveDate,
        cursor: Option<OrderCursor>,
    ) -> BoxStream<'static, Result<OrderEvent>> {
        let log = Arc::clone(&self.log);
        let limit = self.page_size;
        paginate("scan_by_date", self.timeout, cursor, move |after: Option<OrderCursor>| {
            let log = Arc::clone(&log);
            async move {
                debug!(%date, ?after, "Fetching order page by date");
                log.scan_by_date(date, after.as_ref(), limit).await
            }
        })
    }

    /// A customer's entire order history.
    pub fn by_customer(&self, customer_id: &str) -> BoxStream<'static, Result<OrderEvent>> {
        let log = Arc::clone(&self.log);
        let limit = self.page_size;
        let customer_id = customer_id.to_string();
        paginate("scan_by_customer", self.timeout, None, move |after: Option<OrderCursor>| {
            let log = Arc::clone(&log);
            let customer_id = customer_id.clone();
            async move {
                log.scan_by_customer(&customer_id, after.as_ref(), limit)
                    .await
            }
        })
    }

    /// Every customer with at least one order, in ascending id order.
    pub fn customers(&self) -> BoxStream<'static, Result<String>> {
        let log = Arc::clone(&self.log);
        let limit = self.page_size;
        paginate("list_customers", self.timeout, None, move |after: Option<String>| {
            let log = Arc::clone(&log);
            async move { log.list_customers(after.as_deref(), limit).await }
        })
    }
}

/// Turn a page fetcher into a flat stream of rows.
///
/// `fetch` receives the cursor to resume after (`None` for the first page)
/// and is called again only once the previous page has been consumed.
pub fn paginate<T, C, F, Fut>(
    operation: &'static str,
    timeout: Duration,
    start: Option<C>,
    fetch: F,
) -> BoxStream<'static, Result<T>>
where
    T: Send + 'static,
    C: Send + 'static,
    F: FnMut(Option<C>) -> Fut + Send + 'static,
    Fut: Future<Output = storage::Result<Page<T, C>>> + Send + 'static,
{
    // `None` once the last page has been fetched.
    let state: Option<Option<C>> = Some(start);

    stream::try_unfold((fetch, state), move |(mut fetch, state)| async move {
        let Some(after) = state else {
            return Ok(None);
        };

        let page = match within(timeout, operation, fetch(after)).await {
            Ok(page) => page,
            Err(e) => return Err(RollupError::Read(e)),
        };

        let next = page.next.map(Some);
        Ok(Some((page.rows, (fetch, next))))
    })
    .map_ok(|rows| stream::iter(rows.into_iter().map(Ok::<T, RollupError>)))
    .try_flatten()
    .boxed()
}
