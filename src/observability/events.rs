//! Observability events for reeldb
//!
//! Every lifecycle or mutation event that gets logged is listed here.
//! Events are explicit and typed.

use std::fmt;

/// Observable events in reeldb
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Boot & Lifecycle
    /// Startup begins
    BootStart,
    /// Startup complete, catalog ready
    BootComplete,
    /// Configuration loaded
    ConfigLoaded,
    /// Records read from a dataset file
    DatasetLoaded,
    /// No snapshot or dataset found, starting empty
    EmptyCatalog,

    // Snapshot operations
    /// Snapshot read back from disk
    SnapshotLoaded,
    /// Snapshot written to disk
    SnapshotSaved,
    /// Snapshot write failed after a committed mutation
    SnapshotFailed,

    // Index operations
    /// Indexes built from records
    IndexRebuilt,
    /// Catalog consistency verified
    CatalogVerified,

    // Mutations
    /// Record inserted
    RecordInserted,
    /// Record deleted
    RecordDeleted,
    /// Record modified
    RecordModified,
    /// Mutation rejected before any change was made
    MutationRejected,

    // Audit
    /// Audit record could not be written
    AuditFailed,

    // Fatal
    /// A structural invariant is broken (FATAL)
    InvariantViolation,

    // Server operations
    /// Request loop ready
    Serving,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            // Boot & Lifecycle
            Event::BootStart => "REELDB_STARTUP_BEGIN",
            Event::BootComplete => "REELDB_STARTUP_COMPLETE",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::DatasetLoaded => "DATASET_LOADED",
            Event::EmptyCatalog => "EMPTY_CATALOG",

            // Snapshot
            Event::SnapshotLoaded => "SNAPSHOT_LOADED",
            Event::SnapshotSaved => "SNAPSHOT_SAVED",
            Event::SnapshotFailed => "SNAPSHOT_FAILED",

            // Index
            Event::IndexRebuilt => "INDEX_REBUILT",
            Event::CatalogVerified => "CATALOG_VERIFIED",

            // Mutations
            Event::RecordInserted => "RECORD_INSERTED",
            Event::RecordDeleted => "RECORD_DELETED",
            Event::RecordModified => "RECORD_MODIFIED",
            Event::MutationRejected => "MUTATION_REJECTED",

            // Audit
            Event::AuditFailed => "AUDIT_FAILED",

            // Fatal
            Event::InvariantViolation => "INVARIANT_VIOLATION",

            // Server
            Event::Serving => "REELDB_SERVING",
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::InvariantViolation)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_have_string_representation() {
        let events = [
            Event::BootStart,
            Event::BootComplete,
            Event::ConfigLoaded,
            Event::DatasetLoaded,
            Event::EmptyCatalog,
            Event::SnapshotLoaded,
            Event::SnapshotSaved,
            Event::SnapshotFailed,
            Event::IndexRebuilt,
            Event::CatalogVerified,
            Event::RecordInserted,
            Event::RecordDeleted,
            Event::RecordModified,
            Event::MutationRejected,
            Event::AuditFailed,
            Event::InvariantViolation,
            Event::Serving,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_fatal_events() {
        assert!(Event::InvariantViolation.is_fatal());
        assert!(!Event::SnapshotFailed.is_fatal());
        assert!(!Event::RecordInserted.is_fatal());
    }

    #[test]
    fn test_event_display() {
        assert_eq!(format!("{}", Event::BootStart), "REELDB_STARTUP_BEGIN");
        assert_eq!(format!("{}", Event::RecordDeleted), "RECORD_DELETED");
    }
}
