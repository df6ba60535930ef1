//! Catalog startup
//!
//! Sources, in order of preference:
//! 1. The latest snapshot. Saved indexes are checked against the records;
//!    a snapshot without indexes has them rebuilt.
//! 2. A JSON dataset file. Indexes are built from its records.
//! 3. Nothing: the catalog starts empty.
//!
//! The next-id counter is derived last. A saved counter is kept unless it
//! would hand out an id that is already taken.

use std::path::Path;

use crate::observability::{Event, Logger};
use crate::snapshot::SnapshotStore;
use crate::storage::{initial_next_id, load_dataset, RecordStore};

use super::catalog::Catalog;
use super::errors::QueryResult;

/// Where the catalog came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSource {
    Snapshot,
    Dataset,
    Empty,
}

/// Build the startup catalog
pub fn load_catalog(
    snapshots: &dyn SnapshotStore,
    dataset: Option<&Path>,
) -> QueryResult<(Catalog, CatalogSource)> {
    if let Some(snapshot) = snapshots.load()? {
        let mut store = RecordStore::from_records(snapshot.records)?;
        let derived = initial_next_id(store.iter().map(|r| r.id));
        store.set_next_id(snapshot.next_id.max(derived));

        let catalog = match snapshot.indexes {
            Some(indexes) => Catalog::from_parts(store, indexes)?,
            None => {
                let catalog = Catalog::build(store);
                Logger::event(Event::IndexRebuilt, &[("records", &catalog.len().to_string())]);
                catalog
            }
        };
        Logger::event(
            Event::SnapshotLoaded,
            &[
                ("records", &catalog.len().to_string()),
                ("next_id", &catalog.store().get_next_id().to_string()),
            ],
        );
        return Ok((catalog, CatalogSource::Snapshot));
    }

    if let Some(path) = dataset.filter(|p| p.exists()) {
        let records = load_dataset(path)?;
        let catalog = Catalog::build(RecordStore::from_records(records)?);
        Logger::event(
            Event::DatasetLoaded,
            &[("path", &path.display().to_string()), ("records", &catalog.len().to_string())],
        );
        Logger::event(Event::IndexRebuilt, &[("records", &catalog.len().to_string())]);
        return Ok((catalog, CatalogSource::Dataset));
    }

    Logger::event(Event::EmptyCatalog, &[]);
    Ok((Catalog::new(), CatalogSource::Empty))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QueryError;
    use crate::snapshot::{CatalogSnapshot, MemorySnapshotStore};
    use crate::storage::RecordDraft;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_empty_when_nothing_available() {
        let snapshots = MemorySnapshotStore::new();
        let (catalog, source) = load_catalog(&snapshots, Some(Path::new("/nonexistent/movies.json"))).unwrap();
        assert_eq!(source, CatalogSource::Empty);
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_dataset_used_without_snapshot() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("movies.json");
        fs::write(
            &path,
            r#"[{"title": "Heat", "release_date": "1995-12-15", "genres": ["Crime"]},
                {"title": "Ran", "release_date": "1985-06-01", "genres": ["War"]}]"#,
        )
        .unwrap();

        let (catalog, source) = load_catalog(&MemorySnapshotStore::new(), Some(&path)).unwrap();
        assert_eq!(source, CatalogSource::Dataset);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.store().get_next_id(), 2);
        catalog.verify().unwrap();
    }

    #[test]
    fn test_snapshot_preferred_and_counter_kept() {
        let mut original = Catalog::new();
        original.insert(RecordDraft::new("A", "2000", &["X"])).unwrap();
        let gone = original.insert(RecordDraft::new("B", "2001", &["Y"])).unwrap();
        original.delete(gone).unwrap();

        let snapshots = MemorySnapshotStore::new();
        snapshots.save(&original.snapshot()).unwrap();

        let (catalog, source) = load_catalog(&snapshots, None).unwrap();
        assert_eq!(source, CatalogSource::Snapshot);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.store().get_next_id(), 2);
    }

    #[test]
    fn test_snapshot_without_indexes_rebuilt() {
        let mut original = Catalog::new();
        original.insert(RecordDraft::new("A", "2000", &["X"])).unwrap();
        let mut snapshot = original.snapshot();
        snapshot.indexes = None;

        let snapshots = MemorySnapshotStore::new();
        snapshots.save(&snapshot).unwrap();

        let (catalog, _) = load_catalog(&snapshots, None).unwrap();
        assert_eq!(catalog.by_genre("X").unwrap().len(), 1);
    }

    #[test]
    fn test_inconsistent_snapshot_rejected() {
        let mut original = Catalog::new();
        original.insert(RecordDraft::new("A", "2000", &["X"])).unwrap();
        let mut snapshot: CatalogSnapshot = original.snapshot();
        snapshot.records[0].title = "Z".to_string();

        let snapshots = MemorySnapshotStore::new();
        snapshots.save(&snapshot).unwrap();

        let err = load_catalog(&snapshots, None).unwrap_err();
        assert!(matches!(err, QueryError::Corruption(_)));
        assert!(err.is_fatal());
    }
}
