//! Store error types.
//!
//! Failures of the persistence medium behind the stats adapter. The engine
//! never lets these reach the player: a failed read is treated as "no prior
//! stats" and a failed write is logged and dropped.

use thiserror::Error;

/// Errors that can occur when reading or writing persistent stats.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying medium could not be read or written.
    #[error("store I/O failed: {0}")]
    Io(String),

    /// A stored value could not be parsed.
    #[error("corrupt value for '{key}': {value:?}")]
    Corrupt { key: String, value: String },

    /// Values parsed but violate the stats invariants.
    #[error("inconsistent stats: {0}")]
    Inconsistent(String),

    /// The medium's own encoding could not be read or produced.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl StoreError {
    /// Returns `true` if the stored data itself is bad, as opposed to the
    /// medium being unavailable.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            StoreError::Corrupt { .. } | StoreError::Inconsistent(_) | StoreError::Serialization(_)
        )
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e.to_string())
    }
}
