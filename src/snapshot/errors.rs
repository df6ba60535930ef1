//! Snapshot error types
//!
//! Error codes:
//! - REEL_SNAPSHOT_IO_ERROR (ERROR severity)
//! - REEL_SNAPSHOT_FORMAT (ERROR severity)
//! - REEL_SNAPSHOT_CORRUPTED (FATAL severity)

use std::fmt;
use std::io;
use std::path::Path;

/// Severity levels for snapshot errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation fails, process continues
    Error,
    /// Persisted state cannot be trusted
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Snapshot-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotErrorCode {
    /// I/O failure while reading or writing snapshot files
    ReelSnapshotIoError,
    /// Snapshot file could not be encoded or decoded
    ReelSnapshotFormat,
    /// Checksum mismatch between manifest and data files
    ReelSnapshotCorrupted,
}

impl SnapshotErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SnapshotErrorCode::ReelSnapshotIoError => "REEL_SNAPSHOT_IO_ERROR",
            SnapshotErrorCode::ReelSnapshotFormat => "REEL_SNAPSHOT_FORMAT",
            SnapshotErrorCode::ReelSnapshotCorrupted => "REEL_SNAPSHOT_CORRUPTED",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            SnapshotErrorCode::ReelSnapshotIoError => Severity::Error,
            SnapshotErrorCode::ReelSnapshotFormat => Severity::Error,
            SnapshotErrorCode::ReelSnapshotCorrupted => Severity::Fatal,
        }
    }
}

impl fmt::Display for SnapshotErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Snapshot error type with context
#[derive(Debug)]
pub struct SnapshotError {
    /// Error code
    code: SnapshotErrorCode,
    /// Human-readable message
    message: String,
    /// Underlying IO error if applicable
    source: Option<io::Error>,
}

impl SnapshotError {
    /// Create an I/O error
    pub fn io_error(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: SnapshotErrorCode::ReelSnapshotIoError,
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create an I/O error naming the path involved
    pub fn io_error_at_path(path: &Path, source: io::Error) -> Self {
        Self::io_error(format!("I/O error at {}", path.display()), source)
    }

    /// Create a format error
    pub fn format_error(message: impl Into<String>) -> Self {
        Self {
            code: SnapshotErrorCode::ReelSnapshotFormat,
            message: message.into(),
            source: None,
        }
    }

    /// Create a corruption error for a file whose checksum does not match
    pub fn checksum_mismatch(file: &str, expected: &str, actual: &str) -> Self {
        Self {
            code: SnapshotErrorCode::ReelSnapshotCorrupted,
            message: format!("{}: expected {}, found {}", file, expected, actual),
            source: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> SnapshotErrorCode {
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

    /// Returns whether this error is fatal
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)?;
        if let Some(ref source) = self.source {
            write!(f, " (caused by: {})", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for snapshot operations
pub type SnapshotResult<T> = Result<T, SnapshotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(SnapshotErrorCode::ReelSnapshotIoError.code(), "REEL_SNAPSHOT_IO_ERROR");
        assert_eq!(SnapshotErrorCode::ReelSnapshotFormat.code(), "REEL_SNAPSHOT_FORMAT");
        assert_eq!(SnapshotErrorCode::ReelSnapshotCorrupted.code(), "REEL_SNAPSHOT_CORRUPTED");
    }

    #[test]
    fn test_only_corruption_is_fatal() {
        assert!(SnapshotError::checksum_mismatch("records.json", "crc32:00000000", "crc32:00000001").is_fatal());
        assert!(!SnapshotError::format_error("bad json").is_fatal());
        assert!(!SnapshotError::io_error("write", io::Error::new(io::ErrorKind::Other, "x")).is_fatal());
    }

    #[test]
    fn test_display() {
        let err = SnapshotError::checksum_mismatch("indexes.json", "crc32:deadbeef", "crc32:00000000");
        let display = format!("{}", err);
        assert!(display.contains("[FATAL]"));
        assert!(display.contains("REEL_SNAPSHOT_CORRUPTED"));
        assert!(display.contains("indexes.json"));
    }
}
