//! Preference reconciliation.
//!
//! For every customer in scope the per-category counts are recomputed from
//! the customer's whole order history, and the inverted index is corrected
//! with the fewest writes that leave exactly one row for the customer.
//!
//! Writes are single-row and not transactional. A run interrupted between
//! the delete and the insert of a transition leaves the customer with no
//! row, which the next run sees as [`StoredPreference::Absent`] and repairs.

use std::pin::pin;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use crate::error::{Result, RollupError};
use crate::model::{Category, CategoryCounts, PreferenceRow};
use crate::services::reader::OrderReader;
use crate::storage::helpers::within;
use crate::storage::{PreferenceIndex, Session};

/// Which customers a run reconsiders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconcileScope {
    /// Customers with at least one order on the target date.
    #[default]
    Incremental,
    /// Every customer in the order log.
    Full,
}

impl ReconcileScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReconcileScope::Incremental => "incremental",
            ReconcileScope::Full => "full",
        }
    }
}

/// What the index currently holds for one customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredPreference {
    Absent,
    Single(Category),
    /// More than one row; left behind by an earlier failure.
    Multiple(Vec<Category>),
}

impl StoredPreference {
    pub fn from_categories(mut categories: Vec<Category>) -> Self {
        match categories.len() {
            0 => StoredPreference::Absent,
            1 => StoredPreference::Single(categories.remove(0)),
            _ => StoredPreference::Multiple(categories),
        }
    }
}

/// Index writes that move a customer from `stored` to `desired`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    /// Rows to delete, issued before the insert.
    pub deletes: Vec<Category>,
    /// Whether `(desired, customer)` must be inserted.
    pub insert: bool,
}

impl Plan {
    pub fn writes(&self) -> usize {
        self.deletes.len() + usize::from(self.insert)
    }
}

/// Compute the correcting writes.
pub fn plan(stored: &StoredPreference, desired: Category) -> Plan {
    match stored {
        StoredPreference::Absent => Plan {
            deletes: Vec::new(),
            insert: true,
        },
        StoredPreference::Single(old) if *old == desired => Plan {
            deletes: Vec::new(),
            insert: false,
        },
        StoredPreference::Single(old) => Plan {
            deletes: vec![*old],
            insert: true,
        },
        StoredPreference::Multiple(categories) => Plan {
            deletes: categories
                .iter()
                .copied()
                .filter(|c| *c != desired)
                .collect(),
            insert: !categories.contains(&desired),
        },
    }
}

/// How one customer's index state changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// No row existed; one was inserted.
    Created(Category),
    /// The single stored row moved to another category.
    Changed { from: Category, to: Category },
    /// Several rows existed; all but the dominant one were removed.
    Repaired(Category),
    /// The stored row already matched.
    Unchanged(Category),
    /// The customer has no orders.
    Skipped,
}

impl Transition {
    fn between(stored: &StoredPreference, desired: Category) -> Self {
        match stored {
            StoredPreference::Absent => Transition::Created(desired),
            StoredPreference::Single(old) if *old == desired => Transition::Unchanged(desired),
            StoredPreference::Single(old) => Transition::Changed {
                from: *old,
                to: desired,
            },
            StoredPreference::Multiple(_) => Transition::Repaired(desired),
        }
    }
}

/// Result of reconciling one customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerOutcome {
    pub customer_id: String,
    pub transition: Transition,
    /// Index writes issued.
    pub writes: usize,
}

/// Totals for a reconciliation run.
#[derive(Debug, Default)]
pub struct ReconcileReport {
    pub created: usize,
    pub changed: usize,
    pub repaired: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub writes: usize,
    /// Customers whose reconciliation failed, with the cause.
    pub failures: Vec<(String, RollupError)>,
    /// Failure while enumerating the scope itself.
    pub scope_error: Option<RollupError>,
}

impl ReconcileReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.scope_error.is_none()
    }

    /// Customers reconciled without error.
    pub fn reconciled(&self) -> usize {
        self.created + self.changed + self.repaired + self.unchanged + self.skipped
    }

    fn record(&mut self, outcome: CustomerOutcome) {
        match outcome.transition {
            Transition::Created(_) => self.created += 1,
            Transition::Changed { .. } => self.changed += 1,
            Transition::Repaired(_) => self.repaired += 1,
            Transition::Unchanged(_) => self.unchanged += 1,
            Transition::Skipped => self.skipped += 1,
        }
        self.writes += outcome.writes;
    }
}

enum Step {
    Customer(String, Result<CustomerOutcome>),
    ScopeFailed(RollupError),
}

/// Keeps the preference index in line with order history.
pub struct PreferenceReconciler {
    reader: OrderReader,
    index: Arc<dyn PreferenceIndex>,
    timeout: Duration,
    workers: usize,
}

impl PreferenceReconciler {
    /// `workers` bounds how many customers are reconciled at once.
    pub fn new(session: &Session, workers: usize) -> Self {
        Self {
            reader: OrderReader::new(session),
            index: Arc::clone(&session.preferences),
            timeout: session.timeout(),
            workers: workers.max(1),
        }
    }

    /// Count a customer's entire order history by category.
    pub async fn counts_for(&self, customer_id: &str) -> Result<CategoryCounts> {
        self.reader
            .by_customer(customer_id)
            .try_fold(CategoryCounts::new(), |mut counts, order| async move {
                counts.record(order.category);
                Ok(counts)
            })
            .await
    }

    /// Look up every `(category, customer)` key.
    pub async fn current_preference(&self, customer_id: &str) -> Result<StoredPreference> {
        let mut present = Vec::new();
        for category in Category::ALL {
            let found = within(
                self.timeout,
                "preference_lookup",
                self.index.contains(category, customer_id),
            )
            .await
            .map_err(RollupError::Read)?;
            if found {
                present.push(category);
            }
        }
        Ok(StoredPreference::from_categories(present))
    }

    async fn apply(&self, customer_id: &str, plan: &Plan, desired: Category) -> Result<()> {
        for category in &plan.deletes {
            within(
                self.timeout,
                "preference_delete",
                self.index.delete(*category, customer_id),
            )
            .await
            .map_err(RollupError::Write)?;
        }

        if plan.insert {
            let row = PreferenceRow::new(desired, customer_id);
            within(self.timeout, "preference_insert", self.index.insert(&row))
                .await
                .map_err(RollupError::Write)?;
        }

        Ok(())
    }

    /// Bring one customer's index rows in line with their history.
    pub async fn reconcile_customer(&self, customer_id: &str) -> Result<CustomerOutcome> {
        let counts = self.counts_for(customer_id).await?;

        let Some(desired) = counts.dominant() else {
            debug!(customer = %customer_id, "No order history, skipping");
            return Ok(CustomerOutcome {
                customer_id: customer_id.to_string(),
                transition: Transition::Skipped,
                writes: 0,
            });
        };

        let stored = self.current_preference(customer_id).await?;
        if let StoredPreference::Multiple(categories) = &stored {
            warn!(
                customer = %customer_id,
                stored = ?categories,
                preferred = %desired,
                "Multiple preference rows, repairing"
            );
        }

        let plan = plan(&stored, desired);
        self.apply(customer_id, &plan, desired).await?;

        let transition = Transition::between(&stored, desired);
        debug!(
            customer = %customer_id,
            ?transition,
            writes = plan.writes(),
            "Customer reconciled"
        );

        Ok(CustomerOutcome {
            customer_id: customer_id.to_string(),
            transition,
            writes: plan.writes(),
        })
    }

    /// Reconcile every customer the stream yields.
    ///
    /// A failed customer is recorded and the rest are still processed.
    /// An error from the stream itself ends enumeration and is kept as
    /// [`ReconcileReport::scope_error`].
    pub async fn reconcile(&self, customers: BoxStream<'_, Result<String>>) -> ReconcileReport {
        let steps = customers
            .map(|item| async move {
                match item {
                    Ok(customer_id) => {
                        let outcome = self.reconcile_customer(&customer_id).await;
                        Step::Customer(customer_id, outcome)
                    }
                    Err(e) => Step::ScopeFailed(e),
                }
            })
            .buffer_unordered(self.workers);
        let mut steps = pin!(steps);

        let mut report = ReconcileReport::default();
        while let Some(step) = steps.next().await {
            match step {
                Step::Customer(_, Ok(outcome)) => report.record(outcome),
                Step::Customer(customer_id, Err(e)) => {
                    error!(
                        customer = %customer_id,
                        kind = e.kind(),
                        error = %e,
                        "Failed to reconcile customer"
                    );
                    report.failures.push((customer_id, e));
                }
                Step::ScopeFailed(e) => {
                    error!(error = %e, "Failed to enumerate customers");
                    report.scope_error = Some(e);
                }
            }
        }

        info!(
            created = report.created,
            changed = report.changed,
            repaired = report.repaired,
            unchanged = report.unchanged,
            skipped = report.skipped,
            failed = report.failures.len(),
            writes = report.writes,
            "Preferences reconciled"
        );

        report
    }
}
