//! Snapshot subsystem for reeldb
//!
//! A snapshot is a durable copy of the catalog: every record, the next-id
//! counter and, optionally, the three secondary indexes.
//!
//! # Snapshot Contents
//!
//! - records.json (records sorted by id)
//! - indexes.json (object with fixed keys `title`, `year`, `genre`)
//! - manifest.json (checksums and metadata, written last)
//!
//! Snapshots are taken after a mutation commits. Failing to write one never
//! affects the in-memory catalog.

mod checksum;
mod errors;
mod manifest;

pub use checksum::{compute_checksum, format_checksum, parse_checksum};
pub use errors::{Severity, SnapshotError, SnapshotErrorCode, SnapshotResult};
pub use manifest::{SnapshotManifest, FORMAT_VERSION};

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::Serialize;

use crate::index::IndexSet;
use crate::storage::{MovieRecord, RecordId};

const RECORDS_FILE: &str = "records.json";
const INDEXES_FILE: &str = "indexes.json";
const MANIFEST_FILE: &str = "manifest.json";

/// Everything needed to bring a catalog back
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    /// Next-id counter
    pub next_id: RecordId,
    /// Records sorted by id
    pub records: Vec<MovieRecord>,
    /// Saved indexes; rebuilt from records when absent
    pub indexes: Option<IndexSet>,
}

/// Persistence collaborator
pub trait SnapshotStore: Send + Sync {
    /// Replace the stored snapshot
    fn save(&self, snapshot: &CatalogSnapshot) -> SnapshotResult<()>;

    /// Latest snapshot, or `None` if nothing has been saved yet
    fn load(&self) -> SnapshotResult<Option<CatalogSnapshot>>;
}

/// Snapshot kept in a directory on disk.
///
/// Save order:
/// 1. Write and fsync `records.json.tmp` / `indexes.json.tmp`
/// 2. Remove the old manifest
/// 3. Rename data files into place
/// 4. Write, fsync and rename the manifest
/// 5. fsync the directory
///
/// A crash before step 4 leaves no manifest, which loads as "no snapshot".
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    /// Store rooted at `dir`. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Snapshot directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the manifest file
    pub fn manifest_path(&self) -> PathBuf {
        self.dir.join(MANIFEST_FILE)
    }

    fn temp_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.tmp", name))
    }

    fn read_verified(&self, name: &str, expected: &str) -> SnapshotResult<Vec<u8>> {
        let path = self.dir.join(name);
        let bytes = fs::read(&path).map_err(|e| SnapshotError::io_error_at_path(&path, e))?;
        let actual = format_checksum(compute_checksum(&bytes));

        match parse_checksum(expected) {
            Some(value) if format_checksum(value) == actual => Ok(bytes),
            Some(_) => Err(SnapshotError::checksum_mismatch(name, expected, &actual)),
            None => Err(SnapshotError::format_error(format!(
                "Malformed checksum {:?} for {}",
                expected, name
            ))),
        }
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn save(&self, snapshot: &CatalogSnapshot) -> SnapshotResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| SnapshotError::io_error_at_path(&self.dir, e))?;

        let records_tmp = self.temp_path(RECORDS_FILE);
        let records_checksum = write_json(&records_tmp, &snapshot.records)?;

        let indexes_checksum = match &snapshot.indexes {
            Some(indexes) => Some(write_json(&self.temp_path(INDEXES_FILE), indexes)?),
            None => None,
        };

        let manifest_path = self.manifest_path();
        remove_if_exists(&manifest_path)?;

        rename(&records_tmp, &self.dir.join(RECORDS_FILE))?;
        if indexes_checksum.is_some() {
            rename(&self.temp_path(INDEXES_FILE), &self.dir.join(INDEXES_FILE))?;
        } else {
            remove_if_exists(&self.dir.join(INDEXES_FILE))?;
        }

        let manifest = SnapshotManifest::new(
            snapshot.records.len(),
            snapshot.next_id,
            format_checksum(records_checksum),
            indexes_checksum.map(format_checksum),
        );
        let manifest_tmp = self.temp_path(MANIFEST_FILE);
        manifest.write_to_file(&manifest_tmp)?;
        rename(&manifest_tmp, &manifest_path)?;

        fsync_dir(&self.dir)
    }

    fn load(&self) -> SnapshotResult<Option<CatalogSnapshot>> {
        let manifest_path = self.manifest_path();
        if !manifest_path.exists() {
            return Ok(None);
        }
        let manifest = SnapshotManifest::read_from_file(&manifest_path)?;

        let bytes = self.read_verified(RECORDS_FILE, &manifest.records_checksum)?;
        let records: Vec<MovieRecord> = serde_json::from_slice(&bytes)
            .map_err(|e| SnapshotError::format_error(format!("Failed to parse {}: {}", RECORDS_FILE, e)))?;
        if records.len() != manifest.record_count {
            return Err(SnapshotError::format_error(format!(
                "Manifest lists {} records, {} holds {}",
                manifest.record_count,
                RECORDS_FILE,
                records.len()
            )));
        }

        let indexes = match &manifest.indexes_checksum {
            Some(expected) => {
                let bytes = self.read_verified(INDEXES_FILE, expected)?;
                let indexes: IndexSet = serde_json::from_slice(&bytes).map_err(|e| {
                    SnapshotError::format_error(format!("Failed to parse {}: {}", INDEXES_FILE, e))
                })?;
                Some(indexes)
            }
            None => None,
        };

        Ok(Some(CatalogSnapshot {
            next_id: manifest.next_id,
            records,
            indexes,
        }))
    }
}

/// Snapshot held in memory
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    latest: Mutex<Option<CatalogSnapshot>>,
    saves: Mutex<usize>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful saves
    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn save(&self, snapshot: &CatalogSnapshot) -> SnapshotResult<()> {
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(snapshot.clone());
        *self.saves.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }

    fn load(&self) -> SnapshotResult<Option<CatalogSnapshot>> {
        Ok(self.latest.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }
}

/// Serialize, write and fsync; returns the checksum of the written bytes
fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> SnapshotResult<u32> {
    let bytes = serde_json::to_vec(value)
        .map_err(|e| SnapshotError::format_error(format!("Failed to serialize {}: {}", path.display(), e)))?;

    let mut file = File::create(path).map_err(|e| SnapshotError::io_error_at_path(path, e))?;
    file.write_all(&bytes).map_err(|e| SnapshotError::io_error_at_path(path, e))?;
    file.sync_all().map_err(|e| SnapshotError::io_error_at_path(path, e))?;

    Ok(compute_checksum(&bytes))
}

fn rename(from: &Path, to: &Path) -> SnapshotResult<()> {
    fs::rename(from, to).map_err(|e| SnapshotError::io_error_at_path(to, e))
}

fn remove_if_exists(path: &Path) -> SnapshotResult<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(SnapshotError::io_error_at_path(path, e)),
    }
}

fn fsync_dir(path: &Path) -> SnapshotResult<()> {
    let dir = File::open(path).map_err(|e| SnapshotError::io_error_at_path(path, e))?;
    dir.sync_all().map_err(|e| SnapshotError::io_error_at_path(path, e))
}
