//! Snapshot Recovery Tests
//!
//! A catalog saved to disk comes back with the same records, indexes and
//! id counter; damaged snapshots are refused.

use std::fs;
use std::sync::Arc;

use reeldb::query::{load_catalog, Catalog, CatalogSource, QueryEngine, QueryError};
use reeldb::snapshot::{FileSnapshotStore, SnapshotErrorCode, SnapshotStore};
use reeldb::storage::{RecordDraft, RecordPatch};
use tempfile::TempDir;

fn populated(dir: &TempDir) -> (QueryEngine, Arc<FileSnapshotStore>) {
    let store = Arc::new(FileSnapshotStore::new(dir.path().join("snapshot")));
    let engine = QueryEngine::new(Catalog::new()).with_snapshots(store.clone(), true);

    engine.insert(RecordDraft::new("Heat", "1995-12-15", &["Crime", "Drama"])).unwrap();
    let ran = engine.insert(RecordDraft::new("Ran", "1985-06-01", &["War", "Drama"])).unwrap();
    engine.insert(RecordDraft::new("Alien", "1979-05-25", &["Horror"])).unwrap();
    engine.modify(ran, RecordPatch::new().genres(&["War"])).unwrap();
    engine.delete(0).unwrap();

    (engine, store)
}

#[test]
fn test_snapshot_round_trip() {
    let dir = TempDir::new().unwrap();
    let (engine, store) = populated(&dir);

    let (catalog, source) = load_catalog(store.as_ref(), None).unwrap();
    assert_eq!(source, CatalogSource::Snapshot);

    let reloaded = QueryEngine::new(catalog);
    let (before, after) = (engine.stats().unwrap(), reloaded.stats().unwrap());
    assert_eq!(
        (after.records, after.next_id, after.titles, after.years, after.genres),
        (before.records, before.next_id, before.titles, before.years, before.genres)
    );
    assert_eq!(reloaded.records().unwrap(), engine.records().unwrap());
    assert!(reloaded.search_by_genre("Drama").unwrap().is_empty());
    reloaded.verify().unwrap();

    assert_eq!(reloaded.insert(RecordDraft::new("Up", "2009", &[])).unwrap(), 3);
}

#[test]
fn test_shared_title_reloads_after_owner_deleted() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(FileSnapshotStore::new(dir.path().join("snapshot")));
    let engine = QueryEngine::new(Catalog::new()).with_snapshots(store.clone(), true);

    let first = engine.insert(RecordDraft::new("Solaris", "1972", &["Drama"])).unwrap();
    let second = engine.insert(RecordDraft::new("Solaris", "2002", &["Drama"])).unwrap();
    let heat = engine.insert(RecordDraft::new("Heat", "1995", &["Crime"])).unwrap();
    engine.delete(second).unwrap();
    engine.modify(heat, RecordPatch::new().title("Ran")).unwrap();
    engine.verify().unwrap();

    let (catalog, source) = load_catalog(store.as_ref(), None).unwrap();
    assert_eq!(source, CatalogSource::Snapshot);
    let reloaded = QueryEngine::new(catalog);
    assert_eq!(reloaded.search_by_title("Solaris").unwrap().unwrap().id, first);
    assert_eq!(reloaded.search_by_title("Ran").unwrap().unwrap().id, heat);
    assert!(reloaded.search_by_title("Heat").unwrap().is_none());
}

#[test]
fn test_corrupted_indexes_refused() {
    let dir = TempDir::new().unwrap();
    let (_engine, store) = populated(&dir);

    let path = store.dir().join("indexes.json");
    let damaged = fs::read_to_string(&path).unwrap().replace("Horror", "Horrid");
    fs::write(&path, damaged).unwrap();

    match load_catalog(store.as_ref(), None) {
        Err(QueryError::Snapshot(e)) => assert_eq!(e.code(), SnapshotErrorCode::ReelSnapshotCorrupted),
        other => panic!("expected corruption, got {:?}", other.map(|(_, s)| s)),
    }
}

#[test]
fn test_missing_manifest_falls_back_to_dataset() {
    let dir = TempDir::new().unwrap();
    let (_engine, store) = populated(&dir);
    fs::remove_file(store.manifest_path()).unwrap();

    let dataset = dir.path().join("movies.json");
    fs::write(&dataset, r#"[{"id": 7, "title": "Up", "release_date": "2009-05-29", "genres": []}]"#).unwrap();

    let (catalog, source) = load_catalog(store.as_ref(), Some(&dataset)).unwrap();
    assert_eq!(source, CatalogSource::Dataset);
    assert_eq!(catalog.store().get_next_id(), 8);
    assert!(store.load().unwrap().is_none());
}
