//! Process-level utilities.

pub mod bootstrap;
