//! Query errors

use thiserror::Error;

use crate::index::IndexError;
use crate::snapshot::SnapshotError;
use crate::storage::StorageError;

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Query and mutation errors
#[derive(Debug, Error)]
pub enum QueryError {
    /// Request rejected before any change was made
    #[error("Validation error: {0}")]
    Validation(String),

    /// A catalog invariant no longer holds
    #[error("{0}")]
    Corruption(#[from] IndexError),

    /// Dataset could not be loaded
    #[error("{0}")]
    Storage(#[from] StorageError),

    /// Snapshot could not be loaded
    #[error("{0}")]
    Snapshot(#[from] SnapshotError),

    /// A writer panicked while holding the catalog lock
    #[error("Catalog unavailable: lock poisoned")]
    Poisoned,
}

impl QueryError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Stable error code for responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "REEL_VALIDATION_ERROR",
            Self::Corruption(e) => e.code().code(),
            Self::Storage(e) => e.code().code(),
            Self::Snapshot(e) => e.code().code(),
            Self::Poisoned => "REEL_CATALOG_POISONED",
        }
    }

    /// Whether the catalog must be considered lost
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Corruption(_) | Self::Poisoned => true,
            Self::Snapshot(e) => e.is_fatal(),
            Self::Validation(_) | Self::Storage(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(QueryError::validation("title is required").code(), "REEL_VALIDATION_ERROR");
        assert_eq!(
            QueryError::from(IndexError::data_corruption("x")).code(),
            "REEL_DATA_CORRUPTION"
        );
        assert_eq!(QueryError::Poisoned.code(), "REEL_CATALOG_POISONED");
    }

    #[test]
    fn test_fatality() {
        assert!(!QueryError::validation("x").is_fatal());
        assert!(QueryError::from(IndexError::invariant_violation("x")).is_fatal());
        assert!(!QueryError::from(SnapshotError::format_error("x")).is_fatal());
    }

    #[test]
    fn test_display() {
        let err = QueryError::validation("release_date has no year");
        assert_eq!(err.to_string(), "Validation error: release_date has no year");
    }
}
