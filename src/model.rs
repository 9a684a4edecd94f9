//! Order log and derived table row types.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Menu category of an order.
///
/// The set is closed: every category listed in [`Category::ALL`] gets an
/// explicit daily summary row, zero included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Japanese-style menu (category A).
    Washoku,
    /// Western-style menu (category B).
    Yoshoku,
}

impl Category {
    /// Every known category, in summary-row order.
    pub const ALL: [Category; 2] = [Category::Washoku, Category::Yoshoku];

    /// Category assigned to a customer whose top counts are tied.
    pub const TIE_BREAK: Category = Category::Yoshoku;

    /// Stored string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Washoku => "washoku",
            Category::Yoshoku => "yoshoku",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no known category.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown menu category: {0:?}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "washoku" => Ok(Category::Washoku),
            "yoshoku" => Ok(Category::Yoshoku),
            other => Err(UnknownCategory(other.to_string())),
        }
    }
}

/// A single immutable entry in the raw order log.
///
/// Primary key is `(customer_id, timestamp)`; `order_date` is the UTC
/// calendar date of `timestamp` and addresses the date partition.
/// Timestamps carry at most microsecond precision, the resolution every
/// backend stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderEvent {
    pub order_date: NaiveDate,
    pub customer_id: String,
    pub category: Category,
    pub timestamp: DateTime<Utc>,
}

impl OrderEvent {
    /// Build an order, deriving its date partition from the timestamp.
    ///
    /// Sub-microsecond digits are truncated.
    pub fn new(customer_id: impl Into<String>, timestamp: DateTime<Utc>, category: Category) -> Self {
        let timestamp = timestamp.trunc_subsecs(6);
        Self {
            order_date: timestamp.date_naive(),
            customer_id: customer_id.into(),
            category,
            timestamp,
        }
    }
}

/// Row in the daily summary table, keyed by `(order_date, category)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    pub order_date: NaiveDate,
    pub category: Category,
    pub count: u64,
}

/// Row in the inverted preference index, keyed by `(category, customer_id)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct PreferenceRow {
    pub category: Category,
    pub customer_id: String,
}

impl PreferenceRow {
    pub fn new(category: Category, customer_id: impl Into<String>) -> Self {
        Self {
            category,
            customer_id: customer_id.into(),
        }
    }
}

/// Per-category order counts, seeded with zero for every known category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCounts {
    counts: BTreeMap<Category, u64>,
}

impl Default for CategoryCounts {
    fn default() -> Self {
        Self::new()
    }
}

impl CategoryCounts {
    pub fn new() -> Self {
        Self {
            counts: Category::ALL.iter().map(|c| (*c, 0)).collect(),
        }
    }

    /// Count one more order in `category`.
    pub fn record(&mut self, category: Category) {
        *self.counts.entry(category).or_insert(0) += 1;
    }

    pub fn get(&self, category: Category) -> u64 {
        self.counts.get(&category).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Iterate `(category, count)` pairs in [`Category::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, u64)> + '_ {
        self.counts.iter().map(|(c, n)| (*c, *n))
    }

    /// The category with the strictly greatest count.
    ///
    /// When several categories share the top count, [`Category::TIE_BREAK`]
    /// wins if it is among them, otherwise the first tied category in
    /// [`Category::ALL`] order. Returns `None` when no orders were counted.
    pub fn dominant(&self) -> Option<Category> {
        if self.total() == 0 {
            return None;
        }

        let top = self.counts.values().copied().max().unwrap_or(0);
        let tied: Vec<Category> = self
            .iter()
            .filter(|(_, n)| *n == top)
            .map(|(c, _)| c)
            .collect();

        if tied.contains(&Category::TIE_BREAK) {
            Some(Category::TIE_BREAK)
        } else {
            tied.first().copied()
        }
    }
}

impl FromIterator<Category> for CategoryCounts {
    fn from_iter<I: IntoIterator<Item = Category>>(iter: I) -> Self {
        let mut counts = Self::new();
        for category in iter {
            counts.record(category);
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trips_through_str() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
    }

    #[test]
    fn test_unknown_category_rejected() {
        let err = "chuka".parse::<Category>().unwrap_err();
        assert_eq!(err, UnknownCategory("chuka".to_string()));
    }

    #[test]
    fn test_order_date_derived_from_utc_timestamp() {
        let ts = DateTime::parse_from_rfc3339("2024-01-01T23:30:00-05:00")
            .unwrap()
            .with_timezone(&Utc);
        let order = OrderEvent::new("u1", ts, Category::Washoku);
        assert_eq!(order.order_date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    }

    #[test]
    fn test_timestamp_truncated_to_microseconds() {
        let ts = DateTime::parse_from_rfc3339("2024-01-01T08:00:00.123456789Z")
            .unwrap()
            .with_timezone(&Utc);
        let order = OrderEvent::new("u1", ts, Category::Washoku);
        assert_eq!(order.timestamp.timestamp_subsec_nanos(), 123_456_000);
    }

    #[test]
    fn test_counts_seeded_with_zero() {
        let counts = CategoryCounts::new();
        assert_eq!(counts.iter().count(), Category::ALL.len());
        assert_eq!(counts.total(), 0);
        assert_eq!(counts.dominant(), None);
    }

    #[test]
    fn test_dominant_strictly_greater() {
        let counts: CategoryCounts = [Category::Washoku, Category::Washoku, Category::Yoshoku]
            .into_iter()
            .collect();
        assert_eq!(counts.dominant(), Some(Category::Washoku));
    }

    #[test]
    fn test_tie_resolves_to_tie_break() {
        let counts: CategoryCounts = [
            Category::Washoku,
            Category::Yoshoku,
            Category::Washoku,
            Category::Yoshoku,
        ]
        .into_iter()
        .collect();
        assert_eq!(counts.dominant(), Some(Category::TIE_BREAK));
        assert_eq!(Category::TIE_BREAK, Category::Yoshoku);
    }
}
