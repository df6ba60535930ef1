//! Primary record store
//!
//! Maps record ids to records and owns the next-id counter. The counter
//! starts one past the largest id present and only moves forward, so ids
//! are never handed out twice, even after deletes.

use std::collections::HashMap;

use super::errors::{StorageError, StorageResult};
use super::record::{MovieRecord, RecordId};

/// The single source of truth for record content
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: HashMap<RecordId, MovieRecord>,
    next_id: RecordId,
}

impl RecordStore {
    /// Creates an empty store whose first id is 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from loaded records.
    ///
    /// The counter is derived once here: one greater than the maximum id,
    /// or 0 for an empty dataset.
    pub fn from_records(records: impl IntoIterator<Item = MovieRecord>) -> StorageResult<Self> {
        let mut store = Self::new();
        for record in records {
            store.insert(record)?;
        }
        store.next_id = initial_next_id(store.records.keys().copied());
        Ok(store)
    }

    /// Current value of the next-id counter
    pub fn get_next_id(&self) -> RecordId {
        self.next_id
    }

    /// Overwrite the next-id counter
    pub fn set_next_id(&mut self, next_id: RecordId) {
        self.next_id = next_id;
    }

    /// Hand out the next id and advance the counter
    pub fn allocate_id(&mut self) -> RecordId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Record by id
    pub fn get(&self, id: RecordId) -> Option<&MovieRecord> {
        self.records.get(&id)
    }

    /// Mutable record by id
    pub fn get_mut(&mut self, id: RecordId) -> Option<&mut MovieRecord> {
        self.records.get_mut(&id)
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.records.contains_key(&id)
    }

    /// Add a record. Fails if its id is already taken.
    pub fn insert(&mut self, record: MovieRecord) -> StorageResult<()> {
        if self.records.contains_key(&record.id) {
            return Err(StorageError::duplicate_id(record.id));
        }
        self.records.insert(record.id, record);
        Ok(())
    }

    /// Remove a record, returning it
    pub fn remove(&mut self, id: RecordId) -> Option<MovieRecord> {
        self.records.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = &MovieRecord> {
        self.records.values()
    }

    /// Records sorted by id
    pub fn sorted(&self) -> Vec<&MovieRecord> {
        let mut records: Vec<&MovieRecord> = self.records.values().collect();
        records.sort_by_key(|r| r.id);
        records
    }
}

/// One past the largest id, or 0 when there are none
pub fn initial_next_id(ids: impl IntoIterator<Item = RecordId>) -> RecordId {
    ids.into_iter().max().map_or(0, |max| max + 1)
}
