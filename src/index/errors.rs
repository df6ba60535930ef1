//! Index error types
//!
//! Error codes:
//! - REEL_INDEX_INVARIANT_VIOLATION (FATAL)
//! - REEL_DATA_CORRUPTION (FATAL)
//!
//! Both codes mean a structural invariant of the catalog no longer holds.
//! Neither is recoverable: the in-memory state must be discarded.

use std::fmt;

/// Severity levels for index errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// System must halt immediately
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Index-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexErrorCode {
    /// A tree or catalog invariant was found broken
    ReelIndexInvariantViolation,
    /// Persisted index state disagrees with the records it was built from
    ReelDataCorruption,
}

impl IndexErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            IndexErrorCode::ReelIndexInvariantViolation => "REEL_INDEX_INVARIANT_VIOLATION",
            IndexErrorCode::ReelDataCorruption => "REEL_DATA_CORRUPTION",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Fatal
    }
}

impl fmt::Display for IndexErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Index error type with full context
#[derive(Debug, Clone)]
pub struct IndexError {
    /// Error code
    code: IndexErrorCode,
    /// Human-readable message
    message: String,
    /// Name of the index the problem was found in, if any
    index: Option<&'static str>,
}

impl IndexError {
    /// Create an invariant violation error
    pub fn invariant_violation(reason: impl Into<String>) -> Self {
        Self {
            code: IndexErrorCode::ReelIndexInvariantViolation,
            message: reason.into(),
            index: None,
        }
    }

    /// Create a data corruption error
    pub fn data_corruption(reason: impl Into<String>) -> Self {
        Self {
            code: IndexErrorCode::ReelDataCorruption,
            message: reason.into(),
            index: None,
        }
    }

    /// Attach the name of the offending index
    pub fn in_index(mut self, index: &'static str) -> Self {
        self.index = Some(index);
        self
    }

    /// Returns the error code
    pub fn code(&self) -> IndexErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the index name if known
    pub fn index(&self) -> Option<&'static str> {
        self.index
    }

    /// Returns whether this is a fatal error
    pub fn is_fatal(&self) -> bool {
        true
    }
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: ", self.code.severity(), self.code.code())?;
        if let Some(index) = self.index {
            write!(f, "{} index: ", index)?;
        }
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for IndexError {}

/// Result type for index operations
pub type IndexResult<T> = Result<T, IndexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            IndexErrorCode::ReelIndexInvariantViolation.code(),
            "REEL_INDEX_INVARIANT_VIOLATION"
        );
        assert_eq!(IndexErrorCode::ReelDataCorruption.code(), "REEL_DATA_CORRUPTION");
    }

    #[test]
    fn test_all_errors_are_fatal() {
        let errors = [
            IndexError::invariant_violation("balance factor 2"),
            IndexError::data_corruption("dangling id"),
        ];

        for err in errors {
            assert_eq!(err.severity(), Severity::Fatal);
            assert!(err.is_fatal());
        }
    }

    #[test]
    fn test_error_display() {
        let err = IndexError::invariant_violation("balance factor 2 at key 1999").in_index("year");
        let display = format!("{}", err);
        assert!(display.contains("FATAL"));
        assert!(display.contains("REEL_INDEX_INVARIANT_VIOLATION"));
        assert!(display.contains("year index"));
        assert!(display.contains("1999"));
    }
}
