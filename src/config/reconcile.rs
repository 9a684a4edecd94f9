//! Preference reconciliation configuration.

use serde::Deserialize;

use crate::services::ReconcileScope;

/// Reconciliation configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Which customers a run reconsiders.
    pub scope: ReconcileScope,
    /// Maximum customers reconciled concurrently.
    pub workers: usize,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            scope: ReconcileScope::Incremental,
            workers: 8,
        }
    }
}
