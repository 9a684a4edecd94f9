//! Rollup services: reading the order log and deriving tables from it.

pub mod aggregate;
pub mod ingest;
pub mod pipeline;
pub mod reader;
pub mod reconcile;
pub mod report;

pub use aggregate::{DailySummary, SummaryAggregator, SummaryReport};
pub use ingest::{ingest_lines, parse_line, IngestReport};
pub use pipeline::{Pipeline, RunReport};
pub use reader::OrderReader;
pub use reconcile::{
    CustomerOutcome, PreferenceReconciler, ReconcileReport, ReconcileScope, StoredPreference,
    Transition,
};
pub use report::{DailyReport, ReportQueries, Segment};
