//! Query engine
//!
//! Wraps the catalog in a single reader/writer lock. Reads share the lock;
//! each mutation holds it exclusively from validation to commit.
//!
//! After a mutation commits and the lock is released, the audit sink and the
//! snapshot store are notified. Their failures are logged and never undo the
//! mutation.
//!
//! An invariant violation found while mutating is logged at FATAL and the
//! thread panics with the write lock held. The poisoned lock keeps the
//! broken catalog from ever being read again.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;

use crate::index::IndexError;
use crate::observability::{AuditSink, Event, Logger};
use crate::snapshot::{CatalogSnapshot, SnapshotStore};
use crate::storage::{MovieRecord, RecordDraft, RecordId, RecordPatch};

use super::catalog::Catalog;
use super::errors::{QueryError, QueryResult};

/// Size figures for the catalog and its indexes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub records: usize,
    pub next_id: RecordId,
    pub titles: usize,
    pub years: usize,
    pub genres: usize,
    pub title_height: usize,
    pub year_height: usize,
    pub genre_height: usize,
}

/// Thread-safe access to a catalog
pub struct QueryEngine {
    catalog: RwLock<Catalog>,
    audit: Option<Arc<dyn AuditSink>>,
    snapshots: Option<Arc<dyn SnapshotStore>>,
    snapshot_on_commit: bool,
}

impl QueryEngine {
    /// Engine with no collaborators
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog: RwLock::new(catalog),
            audit: None,
            snapshots: None,
            snapshot_on_commit: false,
        }
    }

    /// Notify `audit` after every committed mutation
    pub fn with_audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Persist through `snapshots`; after every commit when `on_commit` is set
    pub fn with_snapshots(mut self, snapshots: Arc<dyn SnapshotStore>, on_commit: bool) -> Self {
        self.snapshots = Some(snapshots);
        self.snapshot_on_commit = on_commit;
        self
    }

    pub fn search_by_id(&self, id: RecordId) -> QueryResult<Option<MovieRecord>> {
        Ok(self.read()?.get(id).cloned())
    }

    pub fn search_by_title(&self, title: &str) -> QueryResult<Option<MovieRecord>> {
        let catalog = self.read()?;
        Ok(checked(catalog.by_title(title)).cloned())
    }

    pub fn search_by_year(&self, year: i32) -> QueryResult<Vec<MovieRecord>> {
        let catalog = self.read()?;
        Ok(owned(checked(catalog.by_year(year))))
    }

    pub fn search_by_genre(&self, genre: &str) -> QueryResult<Vec<MovieRecord>> {
        let catalog = self.read()?;
        Ok(owned(checked(catalog.by_genre(genre))))
    }

    /// Records whose title starts with `prefix`, ordered by title
    pub fn search_by_prefix(&self, prefix: &str) -> QueryResult<Vec<MovieRecord>> {
        let catalog = self.read()?;
        Ok(owned(checked(catalog.by_prefix(prefix))))
    }

    /// Records released from `from` through `to` inclusive, ordered by year
    pub fn search_by_year_range(&self, from: i32, to: i32) -> QueryResult<Vec<MovieRecord>> {
        let catalog = self.read()?;
        Ok(owned(checked(catalog.by_year_range(from, to))))
    }

    /// Linear scan for `min <= field <= max` over numeric attributes
    pub fn range_query(&self, field: &str, min: f64, max: f64) -> QueryResult<Vec<MovieRecord>> {
        let catalog = self.read()?;
        Ok(owned(catalog.range_query(field, min, max)))
    }

    /// Insert a record; returns its new id
    pub fn insert(&self, draft: RecordDraft) -> QueryResult<RecordId> {
        let (id, title, snapshot) = {
            let mut catalog = self.write()?;
            let title = draft.title.clone().unwrap_or_default();
            let id = match catalog.insert(draft) {
                Ok(id) => id,
                Err(QueryError::Corruption(e)) => fatal(e),
                Err(e) => return Err(rejected("insert", e)),
            };
            (id, title, self.commit_snapshot(&catalog))
        };

        Logger::event(Event::RecordInserted, &[("id", &id.to_string()), ("title", &title)]);
        if let Some(audit) = &self.audit {
            report_audit(audit.record_insert(id, &title));
        }
        self.save(snapshot);
        Ok(id)
    }

    /// Delete a record. Returns false if the id is absent.
    pub fn delete(&self, id: RecordId) -> QueryResult<bool> {
        let (record, snapshot) = {
            let mut catalog = self.write()?;
            match catalog.delete(id) {
                Ok(Some(record)) => (record, self.commit_snapshot(&catalog)),
                Ok(None) => return Ok(false),
                Err(e) => fatal(e),
            }
        };

        Logger::event(Event::RecordDeleted, &[("id", &id.to_string()), ("title", &record.title)]);
        if let Some(audit) = &self.audit {
            report_audit(audit.record_delete(id, &record.title));
        }
        self.save(snapshot);
        Ok(true)
    }

    /// Apply `patch` to a record. Returns false if the id is absent.
    pub fn modify(&self, id: RecordId, patch: RecordPatch) -> QueryResult<bool> {
        let (modification, snapshot) = {
            let mut catalog = self.write()?;
            match catalog.modify(id, patch) {
                Ok(Some(modification)) => (modification, self.commit_snapshot(&catalog)),
                Ok(None) => return Ok(false),
                Err(QueryError::Corruption(e)) => fatal(e),
                Err(e) => return Err(rejected("modify", e)),
            }
        };

        let changed: Vec<&str> = modification.changes.keys().map(String::as_str).collect();
        Logger::event(
            Event::RecordModified,
            &[("id", &id.to_string()), ("changed", &changed.join(","))],
        );
        if let Some(audit) = &self.audit {
            report_audit(audit.record_modify(id, &modification.title, &modification.changes));
        }
        self.save(snapshot);
        Ok(true)
    }

    /// Check every catalog invariant
    pub fn verify(&self) -> QueryResult<()> {
        self.read()?.verify()?;
        Logger::event(Event::CatalogVerified, &[]);
        Ok(())
    }

    /// Save a snapshot now, regardless of `snapshot_on_commit`.
    ///
    /// Returns false when no snapshot store is attached.
    pub fn persist(&self) -> QueryResult<bool> {
        let Some(store) = &self.snapshots else {
            return Ok(false);
        };
        let snapshot = self.read()?.snapshot();
        store.save(&snapshot)?;
        Logger::event(Event::SnapshotSaved, &[("records", &snapshot.records.len().to_string())]);
        Ok(true)
    }

    pub fn stats(&self) -> QueryResult<CatalogStats> {
        let catalog = self.read()?;
        let indexes = catalog.indexes();
        Ok(CatalogStats {
            records: catalog.len(),
            next_id: catalog.store().get_next_id(),
            titles: indexes.title().len(),
            years: indexes.year().len(),
            genres: indexes.genre().len(),
            title_height: indexes.title().height(),
            year_height: indexes.year().height(),
            genre_height: indexes.genre().height(),
        })
    }

    /// Every record, ordered by id
    pub fn records(&self) -> QueryResult<Vec<MovieRecord>> {
        let catalog = self.read()?;
        Ok(owned(catalog.store().sorted()))
    }

    fn read(&self) -> QueryResult<RwLockReadGuard<'_, Catalog>> {
        self.catalog.read().map_err(|_| QueryError::Poisoned)
    }

    fn write(&self) -> QueryResult<RwLockWriteGuard<'_, Catalog>> {
        self.catalog.write().map_err(|_| QueryError::Poisoned)
    }

    fn commit_snapshot(&self, catalog: &Catalog) -> Option<CatalogSnapshot> {
        if self.snapshot_on_commit && self.snapshots.is_some() {
            Some(catalog.snapshot())
        } else {
            None
        }
    }

    fn save(&self, snapshot: Option<CatalogSnapshot>) {
        let (Some(store), Some(snapshot)) = (&self.snapshots, snapshot) else {
            return;
        };
        match store.save(&snapshot) {
            Ok(()) => Logger::event(Event::SnapshotSaved, &[("records", &snapshot.records.len().to_string())]),
            Err(e) => Logger::error(
                Event::SnapshotFailed.as_str(),
                &[("code", e.code().code()), ("error", &e.to_string())],
            ),
        }
    }
}

/// Log a broken invariant at FATAL and abort the current operation.
///
/// Called with the write lock held during mutations, which poisons it.
fn fatal(err: IndexError) -> ! {
    Logger::event(
        Event::InvariantViolation,
        &[("code", err.code().code()), ("error", &err.to_string())],
    );
    panic!("{}", err);
}

fn checked<T>(result: Result<T, IndexError>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => fatal(e),
    }
}

fn owned(records: Vec<&MovieRecord>) -> Vec<MovieRecord> {
    records.into_iter().cloned().collect()
}

fn rejected(operation: &str, err: QueryError) -> QueryError {
    Logger::warn(
        Event::MutationRejected.as_str(),
        &[("operation", operation), ("code", err.code()), ("error", &err.to_string())],
    );
    err
}

fn report_audit(result: crate::observability::ObservabilityResult<()>) {
    if let Err(e) = result {
        Logger::error(
            Event::AuditFailed.as_str(),
            &[("code", e.code().as_str()), ("error", &e.to_string())],
        );
    }
}
