//! SQLite SummaryStore implementation.

use async_trait::async_trait;
use chrono::NaiveDate;
use sea_query::{Expr, OnConflict, Order, Query, SqliteQueryBuilder};
use sea_query_binder::SqlxBinder;
use sqlx::{Row, SqlitePool};

use crate::model::SummaryRow;
use crate::storage::helpers::{format_date, parse_category};
use crate::storage::schema::{DailyOrderSummaries, CREATE_DAILY_ORDER_SUMMARIES_TABLE};
use crate::storage::{Result, StorageError, SummaryStore};

const TABLE: &str = "daily_order_summaries";

/// SQLite implementation of SummaryStore.
pub struct SqliteSummaryStore {
    pool: SqlitePool,
}

impl SqliteSummaryStore {
    /// Create a new SQLite summary store.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn init(&self) -> Result<()> {
        sqlx::raw_sql(CREATE_DAILY_ORDER_SUMMARIES_TABLE)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl SummaryStore for SqliteSummaryStore {
    async fn upsert(&self, row: &SummaryRow) -> Result<()> {
        let count = i64::try_from(row.count).map_err(|_| StorageError::MalformedRow {
            table: TABLE,
            reason: format!("count {} exceeds column range", row.count),
        })?;

        let (sql, values) = Query::insert()
            .into_table(DailyOrderSummaries::Table)
            .columns([
                DailyOrderSummaries::OrderDate,
                DailyOrderSummaries::Category,
                DailyOrderSummaries::Count,
            ])
            .values_panic([
                format_date(&row.order_date).into(),
                row.category.as_str().into(),
                count.into(),
            ])
            .on_conflict(
                OnConflict::columns([DailyOrderSummaries::OrderDate, DailyOrderSummaries::Category])
                    .update_column(DailyOrderSummaries::Count)
                    .to_owned(),
            )
            .build_sqlx(SqliteQueryBuilder);

        sqlx::query_with(&sql, values).execute(&self.pool).await?;
        Ok(())
    }

    async fn get_for_date(&self, date: NaiveDate) -> Result<Vec<SummaryRow>> {
        let (sql, values) = Query::select()
            .columns([DailyOrderSummaries::Category, DailyOrderSummaries::Count])
            .from(DailyOrderSummaries::Table)
            .and_where(Expr::col(DailyOrderSummaries::OrderDate).eq(format_date(&date)))
            .order_by(DailyOrderSummaries::Category, Order::Asc)
            .build_sqlx(SqliteQueryBuilder);

        let rows = sqlx::query_with(&sql, values).fetch_all(&self.pool).await?;

        let mut summaries = Vec::with_capacity(rows.len());
        for row in rows {
            let category: String = row.try_get("category")?;
            let count: i64 = row.try_get("cnt")?;
            summaries.push(SummaryRow {
                order_date: date,
                category: parse_category(TABLE, &category)?,
                count: u64::try_from(count).map_err(|_| StorageError::MalformedRow {
                    table: TABLE,
                    reason: format!("negative count {count}"),
                })?,
            });
        }

        Ok(summaries)
    }
}
