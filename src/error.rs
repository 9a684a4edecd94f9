//! Error kinds surfaced by the rollup pipeline.

use crate::storage::StorageError;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, RollupError>;

/// Errors reported to the operator.
///
/// Storage failures are classified by what the pipeline was doing when
/// they happened, since that decides how much of the run is abandoned:
/// a failed read abandons the entity being derived, a failed write is
/// recorded and the run moves on.
#[derive(Debug, thiserror::Error)]
pub enum RollupError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Connection error: {0}")]
    Connection(#[source] StorageError),

    #[error("Read error: {0}")]
    Read(#[source] StorageError),

    #[error("Write error: {0}")]
    Write(#[source] StorageError),
}

impl RollupError {
    /// Short label for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            RollupError::InvalidInput(_) => "invalid_input",
            RollupError::Connection(_) => "connection",
            RollupError::Read(_) => "read",
            RollupError::Write(_) => "write",
        }
    }
}
