//! Observability subsystem for reeldb
//!
//! - Structured logging (JSON lines)
//! - Typed lifecycle events
//! - Audit trail of committed mutations
//!
//! # Principles
//!
//! 1. Observability is read-only with respect to the catalog
//! 2. A logging or audit failure never fails or rolls back an operation
//! 3. No background threads
//!
//! # Usage
//!
//! ```ignore
//! use reeldb::observability::{Event, Logger};
//!
//! Logger::event(Event::RecordInserted, &[("id", "42")]);
//! Logger::warn("SLOW_SCAN", &[("field", "runtime")]);
//! ```

mod events;
mod logger;
pub mod audit;

pub use audit::{AuditAction, AuditRecord, AuditSink, FileAuditLog, MemoryAuditLog};
pub use events::Event;
pub use logger::{Logger, Severity};

use std::fmt;
use std::io;

/// Observability error code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservabilityErrorCode {
    /// Audit write or read failed
    ReelAuditFailed,
}

impl ObservabilityErrorCode {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ObservabilityErrorCode::ReelAuditFailed => "REEL_AUDIT_FAILED",
        }
    }
}

impl fmt::Display for ObservabilityErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Observability error. Always ERROR severity, never fatal.
#[derive(Debug)]
pub struct ObservabilityError {
    code: ObservabilityErrorCode,
    message: String,
    source: Option<io::Error>,
}

impl ObservabilityError {
    /// Create a new observability error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: ObservabilityErrorCode::ReelAuditFailed,
            message: message.into(),
            source: None,
        }
    }

    /// Create with source error
    pub fn with_source(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: ObservabilityErrorCode::ReelAuditFailed,
            message: message.into(),
            source: Some(source),
        }
    }

    /// Get the error code
    pub fn code(&self) -> ObservabilityErrorCode {
        self.code
    }

    /// Get the message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Observability errors are never fatal
    pub fn is_fatal(&self) -> bool {
        false
    }
}

impl fmt::Display for ObservabilityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ERROR] {}: {}", self.code, self.message)?;
        if let Some(ref source) = self.source {
            write!(f, " (caused by: {})", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ObservabilityError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for observability operations
pub type ObservabilityResult<T> = Result<T, ObservabilityError>;
