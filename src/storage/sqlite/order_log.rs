//! SQLite OrderLog implementation.

use async_trait::async_trait;
use chrono::NaiveDate;
use sea_query::{Cond, Expr, OnConflict, Order, Query, SqliteQueryBuilder};
use sea_query_binder::SqlxBinder;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::model::OrderEvent;
use crate::storage::helpers::{
    format_date, micros_to_timestamp, parse_category, parse_date, timestamp_to_micros,
};
use crate::storage::schema::{RawOrders, CREATE_RAW_ORDERS_TABLE};
use crate::storage::{OrderCursor, OrderLog, Page, Result};

const TABLE: &str = "raw_orders";

/// SQLite implementation of OrderLog.
pub struct SqliteOrderLog {
    pool: SqlitePool,
}

impl SqliteOrderLog {
    /// Create a new SQLite order log.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the table and its date index.
    pub async fn init(&self) -> Result<()> {
        sqlx::raw_sql(CREATE_RAW_ORDERS_TABLE)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Keyset predicate: rows strictly after `(customer_id, ts)`.
    fn after_cursor(cursor: &OrderCursor) -> Cond {
        Cond::any()
            .add(Expr::col(RawOrders::CustomerId).gt(cursor.customer_id.as_str()))
            .add(
                Cond::all()
                    .add(Expr::col(RawOrders::CustomerId).eq(cursor.customer_id.as_str()))
                    .add(Expr::col(RawOrders::Ts).gt(timestamp_to_micros(&cursor.timestamp))),
            )
    }

    async fn fetch_orders(&self, cond: Cond, limit: usize) -> Result<Page<OrderEvent, OrderCursor>> {
        let (sql, values) = Query::select()
            .columns([
                RawOrders::CustomerId,
                RawOrders::Ts,
                RawOrders::OrderDate,
                RawOrders::Category,
            ])
            .from(RawOrders::Table)
            .cond_where(cond)
            .order_by(RawOrders::CustomerId, Order::Asc)
            .order_by(RawOrders::Ts, Order::Asc)
            .limit(limit as u64)
            .build_sqlx(SqliteQueryBuilder);

        let rows = sqlx::query_with(&sql, values).fetch_all(&self.pool).await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in &rows {
            orders.push(decode_order(row)?);
        }

        Ok(Page::from_rows(orders, limit, OrderCursor::after))
    }
}

fn decode_order(row: &SqliteRow) -> Result<OrderEvent> {
    let customer_id: String = row.try_get("customer_id")?;
    let ts: i64 = row.try_get("ts")?;
    let order_date: String = row.try_get("order_date")?;
    let category: String = row.try_get("category")?;

    Ok(OrderEvent {
        order_date: parse_date(TABLE, &order_date)?,
        customer_id,
        category: parse_category(TABLE, &category)?,
        timestamp: micros_to_timestamp(TABLE, ts)?,
    })
}

#[async_trait]
impl OrderLog for SqliteOrderLog {
    async fn append(&self, order: &OrderEvent) -> Result<()> {
        let (sql, values) = Query::insert()
            .into_table(RawOrders::Table)
            .columns([
                RawOrders::CustomerId,
                RawOrders::Ts,
                RawOrders::OrderDate,
                RawOrders::Category,
            ])
            .values_panic([
                order.customer_id.as_str().into(),
                timestamp_to_micros(&order.timestamp).into(),
                format_date(&order.order_date).into(),
                order.category.as_str().into(),
            ])
            .on_conflict(
                OnConflict::columns([RawOrders::CustomerId, RawOrders::Ts])
                    .update_columns([RawOrders::OrderDate, RawOrders::Category])
                    .to_owned(),
            )
            .build_sqlx(SqliteQueryBuilder);

        sqlx::query_with(&sql, values).execute(&self.pool).await?;
        Ok(())
    }

    async fn scan_by_date(
        &self,
        date: NaiveDate,
        after: Option<&OrderCursor>,
        limit: usize,
    ) -> Result<Page<OrderEvent, OrderCursor>> {
        let mut cond = Cond::all().add(Expr::col(RawOrders::OrderDate).eq(format_date(&date)));
        if let Some(cursor) = after {
            cond = cond.add(Self::after_cursor(cursor));
        }
        self.fetch_orders(cond, limit).await
    }

    async fn scan_by_customer(
        &self,
        customer_id: &str,
        after: Option<&OrderCursor>,
        limit: usize,
    ) -> Result<Page<OrderEvent, OrderCursor>> {
        let mut cond = Cond::all().add(Expr::col(RawOrders::CustomerId).eq(customer_id));
        if let Some(cursor) = after {
            cond = cond.add(Expr::col(RawOrders::Ts).gt(timestamp_to_micros(&cursor.timestamp)));
        }
        self.fetch_orders(cond, limit).await
    }

    async fn list_customers(&self, after: Option<&str>, limit: usize) -> Result<Page<String, String>> {
        let mut query = Query::select();
        query
            .distinct()
            .column(RawOrders::CustomerId)
            .from(RawOrders::Table)
            .order_by(RawOrders::CustomerId, Order::Asc)
            .limit(limit as u64);
        if let Some(after) = after {
            query.and_where(Expr::col(RawOrders::CustomerId).gt(after));
        }
        let (sql, values) = query.build_sqlx(SqliteQueryBuilder);

        let rows = sqlx::query_with(&sql, values).fetch_all(&self.pool).await?;

        let mut customers = Vec::with_capacity(rows.len());
        for row in &rows {
            customers.push(row.try_get::<String, _>("customer_id")?);
        }

        Ok(Page::from_rows(customers, limit, String::clone))
    }
}
