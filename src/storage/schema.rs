//! Database schema definitions using sea-query.
//!
//! These define the table and column identifiers for type-safe query building.

use sea_query::Iden;

/// Raw order log schema.
#[derive(Iden)]
pub enum RawOrders {
    Table,
    #[iden = "customer_id"]
    CustomerId,
    #[iden = "ts"]
    Ts,
    #[iden = "order_date"]
    OrderDate,
    #[iden = "category"]
    Category,
}

/// Daily summary schema.
#[derive(Iden)]
pub enum DailyOrderSummaries {
    Table,
    #[iden = "order_date"]
    OrderDate,
    #[iden = "category"]
    Category,
    #[iden = "cnt"]
    Count,
}

/// Inverted preference index schema.
#[derive(Iden)]
pub enum CustomerPreferences {
    Table,
    #[iden = "category"]
    Category,
    #[iden = "customer_id"]
    CustomerId,
}

/// SQL for creating the raw order log.
///
/// The date index mirrors the `(order_date, customer_id, ts)` key path used
/// by date-bounded scans.
pub const CREATE_RAW_ORDERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS raw_orders (
    customer_id TEXT NOT NULL,
    ts INTEGER NOT NULL,
    order_date TEXT NOT NULL,
    category TEXT NOT NULL,
    PRIMARY KEY (customer_id, ts)
);

CREATE INDEX IF NOT EXISTS idx_raw_orders_date ON raw_orders(order_date, customer_id, ts);
"#;

/// SQL for creating the daily summary table.
pub const CREATE_DAILY_ORDER_SUMMARIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS daily_order_summaries (
    order_date TEXT NOT NULL,
    category TEXT NOT NULL,
    cnt INTEGER NOT NULL,
    PRIMARY KEY (order_date, category)
);
"#;

/// SQL for creating the preference index.
pub const CREATE_CUSTOMER_PREFERENCES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS customer_preferences (
    category TEXT NOT NULL,
    customer_id TEXT NOT NULL,
    PRIMARY KEY (category, customer_id)
);
"#;
