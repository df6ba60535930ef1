//! Storage error types
//!
//! Error codes:
//! - REEL_STORAGE_IO_ERROR (ERROR severity)
//! - REEL_STORAGE_PARSE_ERROR (ERROR severity)
//! - REEL_DUPLICATE_ID (ERROR severity)

use std::fmt;
use std::io;
use std::path::Path;

use super::record::RecordId;

/// Severity levels for storage errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation fails, process continues
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// Storage-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorCode {
    /// Disk I/O failure while reading a dataset
    ReelStorageIoError,
    /// Dataset content is not a valid list of records
    ReelStorageParseError,
    /// Two records claim the same id
    ReelDuplicateId,
}

impl StorageErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            StorageErrorCode::ReelStorageIoError => "REEL_STORAGE_IO_ERROR",
            StorageErrorCode::ReelStorageParseError => "REEL_STORAGE_PARSE_ERROR",
            StorageErrorCode::ReelDuplicateId => "REEL_DUPLICATE_ID",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Error
    }
}

impl fmt::Display for StorageErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Storage error type with context
#[derive(Debug)]
pub struct StorageError {
    /// Error code
    code: StorageErrorCode,
    /// Human-readable message
    message: String,
    /// Optional details about the error context
    details: Option<String>,
    /// Underlying IO error if applicable
    source: Option<io::Error>,
}

impl StorageError {
    /// Create an I/O error for a dataset path
    pub fn io_error(path: &Path, source: io::Error) -> Self {
        Self {
            code: StorageErrorCode::ReelStorageIoError,
            message: format!("Failed to read dataset {}", path.display()),
            details: None,
            source: Some(source),
        }
    }

    /// Create a parse error
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self {
            code: StorageErrorCode::ReelStorageParseError,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Create a parse error pointing at a record position
    pub fn parse_error_at(position: usize, reason: impl Into<String>) -> Self {
        Self {
            code: StorageErrorCode::ReelStorageParseError,
            message: reason.into(),
            details: Some(format!("record_position: {}", position)),
            source: None,
        }
    }

    /// Create a duplicate id error
    pub fn duplicate_id(id: RecordId) -> Self {
        Self {
            code: StorageErrorCode::ReelDuplicateId,
            message: format!("Record id {} already exists", id),
            details: None,
            source: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> StorageErrorCode {
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

    /// Returns additional error details
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        if let Some(ref source) = self.source {
            write!(f, " (caused by: {})", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
