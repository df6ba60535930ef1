//! Audit trail of committed mutations
//!
//! One record per successful insert, delete or modify. Records are written
//! after the mutation commits; a failed write is reported but never undoes
//! the mutation.
//!
//! The file format is one JSON object per line, fsynced after every append.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::storage::RecordId;

use super::{ObservabilityError, ObservabilityResult};

/// Kind of mutation being audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    /// Record inserted
    Inserted,
    /// Record deleted
    Removed,
    /// Record fields changed
    Modified,
}

impl AuditAction {
    /// Returns the action name string
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Inserted => "INSERTED",
            AuditAction::Removed => "REMOVED",
            AuditAction::Modified => "MODIFIED",
        }
    }
}

/// A single audit record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Unique id of this audit entry
    pub record_id: Uuid,
    /// When the entry was created
    pub timestamp: DateTime<Utc>,
    /// What happened
    pub action: AuditAction,
    /// Affected record
    pub movie_id: RecordId,
    /// Title of the affected record at the time of the event
    pub title: String,
    /// Fields that changed, for modifications only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifications: Option<Map<String, Value>>,
}

impl AuditRecord {
    /// Create a new audit record stamped with the current time
    pub fn new(action: AuditAction, movie_id: RecordId, title: impl Into<String>) -> Self {
        Self {
            record_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            action,
            movie_id,
            title: title.into(),
            modifications: None,
        }
    }

    /// Attach the changed fields
    pub fn with_modifications(mut self, changes: Map<String, Value>) -> Self {
        self.modifications = Some(changes);
        self
    }
}

/// Audit collaborator notified after each committed mutation.
pub trait AuditSink: Send + Sync {
    /// Persist one record
    fn append(&self, record: &AuditRecord) -> ObservabilityResult<()>;

    fn record_insert(&self, id: RecordId, title: &str) -> ObservabilityResult<()> {
        self.append(&AuditRecord::new(AuditAction::Inserted, id, title))
    }

    fn record_delete(&self, id: RecordId, title: &str) -> ObservabilityResult<()> {
        self.append(&AuditRecord::new(AuditAction::Removed, id, title))
    }

    fn record_modify(&self, id: RecordId, title: &str, changes: &Map<String, Value>) -> ObservabilityResult<()> {
        self.append(&AuditRecord::new(AuditAction::Modified, id, title).with_modifications(changes.clone()))
    }
}

/// Append-only audit log file
pub struct FileAuditLog {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl FileAuditLog {
    /// Open or create an audit log file, creating parent directories.
    pub fn open(path: impl AsRef<Path>) -> ObservabilityResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ObservabilityError::with_source(format!("Failed to create {}", parent.display()), e)
            })?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| ObservabilityError::with_source(format!("Failed to open {}", path.display()), e))?;

        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    /// Audit log path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record from an audit log file
    pub fn read_all(path: impl AsRef<Path>) -> ObservabilityResult<Vec<AuditRecord>> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| ObservabilityError::with_source(format!("Failed to open {}", path.display()), e))?;

        let mut records = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|e| ObservabilityError::with_source("Failed to read audit log", e))?;
            if line.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str(&line)
                .map_err(|e| ObservabilityError::new(format!("Malformed audit line: {}", e)))?;
            records.push(record);
        }
        Ok(records)
    }
}

impl AuditSink for FileAuditLog {
    fn append(&self, record: &AuditRecord) -> ObservabilityResult<()> {
        let line = serde_json::to_string(record)
            .map_err(|e| ObservabilityError::new(format!("Failed to encode audit record: {}", e)))?;

        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(writer, "{}", line).map_err(|e| ObservabilityError::with_source("Audit append failed", e))?;
        writer.flush().map_err(|e| ObservabilityError::with_source("Audit flush failed", e))?;
        writer
            .get_ref()
            .sync_all()
            .map_err(|e| ObservabilityError::with_source("Audit fsync failed", e))
    }
}

/// In-memory audit log
#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded entries
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditSink for MemoryAuditLog {
    fn append(&self, record: &AuditRecord) -> ObservabilityResult<()> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_record_json_shape() {
        let record = AuditRecord::new(AuditAction::Inserted, 12, "Heat");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["action"], "INSERTED");
        assert_eq!(value["movie_id"], 12);
        assert_eq!(value["title"], "Heat");
        assert!(value.get("modifications").is_none());
    }

    #[test]
    fn test_memory_log_records_in_order() {
        let log = MemoryAuditLog::new();
        log.record_insert(1, "Heat").unwrap();
        log.record_modify(1, "Heat", json!({"runtime": 171}).as_object().unwrap()).unwrap();
        log.record_delete(1, "Heat").unwrap();

        let records = log.records();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].action, AuditAction::Inserted);
        assert_eq!(records[1].action, AuditAction::Modified);
        assert_eq!(records[1].modifications.as_ref().unwrap()["runtime"], json!(171));
        assert_eq!(records[2].action, AuditAction::Removed);
    }

    #[test]
    fn test_file_log_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("audit").join("audit.log");

        let log = FileAuditLog::open(&path).unwrap();
        log.record_insert(3, "Ran").unwrap();
        log.record_delete(3, "Ran").unwrap();

        let records = FileAuditLog::read_all(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].action, AuditAction::Inserted);
        assert_eq!(records[1].action, AuditAction::Removed);
        assert_eq!(records[1].title, "Ran");
    }

    #[test]
    fn test_file_log_appends_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("audit.log");

        FileAuditLog::open(&path).unwrap().record_insert(1, "A").unwrap();
        FileAuditLog::open(&path).unwrap().record_insert(2, "B").unwrap();

        let ids: Vec<RecordId> = FileAuditLog::read_all(&path).unwrap().iter().map(|r| r.movie_id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_action_names() {
        assert_eq!(AuditAction::Inserted.as_str(), "INSERTED");
        assert_eq!(AuditAction::Removed.as_str(), "REMOVED");
        assert_eq!(AuditAction::Modified.as_str(), "MODIFIED");
    }
}
