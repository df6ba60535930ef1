//! Snapshot manifest
//!
//! `manifest.json` is written last. A snapshot without a manifest does not
//! exist as far as loading is concerned.
//!
//! Format:
//! ```json
//! {
//!   "format_version": 1,
//!   "created_at": "2026-10-19T09:30:00Z",
//!   "record_count": 4803,
//!   "next_id": 4803,
//!   "records_checksum": "crc32:deadbeef",
//!   "indexes_checksum": "crc32:abcd1234"
//! }
//! ```

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::storage::RecordId;

use super::errors::{SnapshotError, SnapshotResult};

/// Current manifest format
pub const FORMAT_VERSION: u8 = 1;

/// Snapshot descriptor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SnapshotManifest {
    /// Manifest format version
    pub format_version: u8,

    /// Creation timestamp (RFC3339, UTC, seconds precision)
    pub created_at: String,

    /// Number of records in `records.json`
    pub record_count: usize,

    /// Next-id counter at save time
    pub next_id: RecordId,

    /// Checksum of `records.json`
    pub records_checksum: String,

    /// Checksum of `indexes.json`, absent when indexes were not saved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexes_checksum: Option<String>,
}

impl SnapshotManifest {
    /// Creates a manifest stamped with the current time
    pub fn new(
        record_count: usize,
        next_id: RecordId,
        records_checksum: impl Into<String>,
        indexes_checksum: Option<String>,
    ) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            created_at: Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            record_count,
            next_id,
            records_checksum: records_checksum.into(),
            indexes_checksum,
        }
    }

    /// Deserializes and checks the format version
    pub fn from_json(json: &str) -> SnapshotResult<Self> {
        let manifest: Self = serde_json::from_str(json)
            .map_err(|e| SnapshotError::format_error(format!("Failed to parse manifest: {}", e)))?;
        if manifest.format_version != FORMAT_VERSION {
            return Err(SnapshotError::format_error(format!(
                "Unsupported manifest format_version {}",
                manifest.format_version
            )));
        }
        Ok(manifest)
    }

    /// Writes the manifest and fsyncs it
    pub fn write_to_file(&self, path: &Path) -> SnapshotResult<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| SnapshotError::format_error(format!("Failed to serialize manifest: {}", e)))?;

        let mut file = File::create(path).map_err(|e| SnapshotError::io_error_at_path(path, e))?;
        file.write_all(json.as_bytes())
            .map_err(|e| SnapshotError::io_error_at_path(path, e))?;
        file.sync_all().map_err(|e| SnapshotError::io_error_at_path(path, e))
    }

    /// Reads a manifest from a file
    pub fn read_from_file(path: &Path) -> SnapshotResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| SnapshotError::io_error_at_path(path, e))?;
        Self::from_json(&content)
    }
}
