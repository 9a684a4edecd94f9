//! SQLite PreferenceIndex implementation.

use async_trait::async_trait;
use sea_query::{Expr, OnConflict, Order, Query, SqliteQueryBuilder};
use sea_query_binder::SqlxBinder;
use sqlx::{Row, SqlitePool};

use crate::model::{Category, PreferenceRow};
use crate::storage::schema::{CustomerPreferences, CREATE_CUSTOMER_PREFERENCES_TABLE};
use crate::storage::{Page, PreferenceIndex, Result};

/// SQLite implementation of PreferenceIndex.
pub struct SqlitePreferenceIndex {
    pool: SqlitePool,
}

impl SqlitePreferenceIndex {
    /// Create a new SQLite preference index.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn init(&self) -> Result<()> {
        sqlx::raw_sql(CREATE_CUSTOMER_PREFERENCES_TABLE)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl PreferenceIndex for SqlitePreferenceIndex {
    async fn contains(&self, category: Category, customer_id: &str) -> Result<bool> {
        let (sql, values) = Query::select()
            .column(CustomerPreferences::CustomerId)
            .from(CustomerPreferences::Table)
            .and_where(Expr::col(CustomerPreferences::Category).eq(category.as_str()))
            .and_where(Expr::col(CustomerPreferences::CustomerId).eq(customer_id))
            .limit(1)
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.is_some())
    }

    async fn insert(&self, row: &PreferenceRow) -> Result<()> {
        let (sql, values) = Query::insert()
            .into_table(CustomerPreferences::Table)
            .columns([CustomerPreferences::Category, CustomerPreferences::CustomerId])
            .values_panic([row.category.as_str().into(), row.customer_id.as_str().into()])
            .on_conflict(
                OnConflict::columns([CustomerPreferences::Category, CustomerPreferences::CustomerId])
                    .do_nothing()
                    .to_owned(),
            )
            .build_sqlx(SqliteQueryBuilder);

        sqlx::query_with(&sql, values).execute(&self.pool).await?;
        Ok(())
    }

    async fn delete(&self, category: Category, customer_id: &str) -> Result<()> {
        let (sql, values) = Query::delete()
            .from_table(CustomerPreferences::Table)
            .and_where(Expr::col(CustomerPreferences::Category).eq(category.as_str()))
            .and_where(Expr::col(CustomerPreferences::CustomerId).eq(customer_id))
            .build_sqlx(SqliteQueryBuilder);

        sqlx::query_with(&sql, values).execute(&self.pool).await?;
        Ok(())
    }

    async fn list_by_category(
        &self,
        category: Category,
        after: Option<&str>,
        limit: usize,
    ) -> Result<Page<String, String>> {
        let mut query = Query::select();
        query
            .column(CustomerPreferences::CustomerId)
            .from(CustomerPreferences::Table)
            .and_where(Expr::col(CustomerPreferences::Category).eq(category.as_str()))
            .order_by(CustomerPreferences::CustomerId, Order::Asc)
            .limit(limit as u64);
        if let Some(after) = after {
            query.and_where(Expr::col(CustomerPreferences::CustomerId).gt(after));
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
