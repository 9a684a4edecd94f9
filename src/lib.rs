//! menu-rollup - daily order rollup and preference index
//!
//! Recomputes derived tables from an append-only log of customer orders:
//! a per-category order count for each day, and an inverted index of each
//! customer's preferred menu category.

pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod services;
pub mod storage;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_utils;

pub use error::{Result, RollupError};
