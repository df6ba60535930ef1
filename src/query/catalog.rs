//! The catalog consistency domain
//!
//! A `Catalog` pairs the record store with the three secondary indexes.
//! Every mutation keeps them in step; `verify` checks that they are.
//!
//! The catalog itself is not synchronized. `QueryEngine` wraps it in a
//! single lock so that a mutation is never observed half applied.

use serde_json::{Map, Value};

use crate::index::{prefix_scan, IndexError, IndexResult, IndexSet};
use crate::snapshot::CatalogSnapshot;
use crate::storage::{distinct, year_of, MovieRecord, RecordDraft, RecordId, RecordPatch, RecordStore};

use super::errors::{QueryError, QueryResult};

/// Outcome of a committed modification
#[derive(Debug, Clone, PartialEq)]
pub struct Modification {
    /// Title after the change
    pub title: String,
    /// Fields whose value actually changed, with their new values
    pub changes: Map<String, Value>,
}

/// Record store plus title, year and genre indexes
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    store: RecordStore,
    indexes: IndexSet,
}

impl Catalog {
    /// Empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every record of `store`.
    ///
    /// Records are indexed in ascending id order, so among records sharing
    /// a title the highest id ends up in the title index.
    pub fn build(store: RecordStore) -> Self {
        let mut indexes = IndexSet::new();
        for record in store.sorted() {
            index_record(&mut indexes, record);
        }
        Self { store, indexes }
    }

    /// Pair a store with previously saved indexes.
    ///
    /// Fails with `REEL_DATA_CORRUPTION` if the indexes do not describe
    /// the records exactly.
    pub fn from_parts(store: RecordStore, indexes: IndexSet) -> IndexResult<Self> {
        let catalog = Self { store, indexes };
        catalog
            .verify()
            .map_err(|e| IndexError::data_corruption(format!("saved indexes disagree with records: {}", e)))?;
        Ok(catalog)
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn indexes(&self) -> &IndexSet {
        &self.indexes
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Copy of the full state for persistence
    pub fn snapshot(&self) -> CatalogSnapshot {
        CatalogSnapshot {
            next_id: self.store.get_next_id(),
            records: self.store.sorted().into_iter().cloned().collect(),
            indexes: Some(self.indexes.clone()),
        }
    }

    pub fn get(&self, id: RecordId) -> Option<&MovieRecord> {
        self.store.get(id)
    }

    /// Record currently holding `title` in the title index
    pub fn by_title(&self, title: &str) -> IndexResult<Option<&MovieRecord>> {
        match self.indexes.title().get(title) {
            Some(&id) => self.resolve(id, "title").map(Some),
            None => Ok(None),
        }
    }

    /// Records released in `year`, in insertion order
    pub fn by_year(&self, year: i32) -> IndexResult<Vec<&MovieRecord>> {
        match self.indexes.year().get(&year) {
            Some(ids) => self.resolve_all(ids, "year"),
            None => Ok(Vec::new()),
        }
    }

    /// Records tagged with `genre`, in insertion order
    pub fn by_genre(&self, genre: &str) -> IndexResult<Vec<&MovieRecord>> {
        match self.indexes.genre().get(genre) {
            Some(ids) => self.resolve_all(ids, "genre"),
            None => Ok(Vec::new()),
        }
    }

    /// Records whose title starts with `prefix`, ordered by title
    pub fn by_prefix(&self, prefix: &str) -> IndexResult<Vec<&MovieRecord>> {
        prefix_scan(self.indexes.title(), prefix)
            .into_iter()
            .map(|&id| self.resolve(id, "title"))
            .collect()
    }

    /// Records released from `from` through `to`, ordered by year.
    ///
    /// Empty when `from > to`.
    pub fn by_year_range(&self, from: i32, to: i32) -> IndexResult<Vec<&MovieRecord>> {
        let mut records = Vec::new();
        for (_, ids) in self.indexes.year().range(from..=to) {
            records.extend(self.resolve_all(ids, "year")?);
        }
        Ok(records)
    }

    /// Records whose numeric `field` lies in `[min, max]`, ordered by id.
    ///
    /// Full scan of the store. Records lacking the field, or holding a
    /// non-numeric value there, are skipped.
    pub fn range_query(&self, field: &str, min: f64, max: f64) -> Vec<&MovieRecord> {
        self.store
            .sorted()
            .into_iter()
            .filter(|record| {
                record
                    .field(field)
                    .and_then(|value| value.as_f64())
                    .map_or(false, |value| min <= value && value <= max)
            })
            .collect()
    }

    /// Insert a new record and index it. Returns the assigned id.
    pub fn insert(&mut self, draft: RecordDraft) -> QueryResult<RecordId> {
        if let Some(id) = draft.id {
            return Err(QueryError::validation(format!(
                "id is assigned by the store and cannot be supplied (got {})",
                id
            )));
        }
        let title = draft.title.ok_or_else(|| QueryError::validation("title is required"))?;
        let release_date = draft
            .release_date
            .ok_or_else(|| QueryError::validation("release_date is required"))?;
        let genres = draft.genres.ok_or_else(|| QueryError::validation("genres is required"))?;
        require_year(&release_date)?;

        let next = self.store.get_next_id();
        if self.store.contains(next) {
            return Err(QueryError::validation(format!("id {} is already taken", next)));
        }

        let id = self.store.allocate_id();
        let record = MovieRecord {
            id,
            title,
            release_date,
            genres,
            extra: draft.extra,
        };
        index_record(&mut self.indexes, &record);
        self.store
            .insert(record)
            .map_err(|e| IndexError::invariant_violation(e.to_string()))?;
        Ok(id)
    }

    /// Remove a record from every index and from the store.
    ///
    /// Returns `None` if the id is absent; nothing is touched then.
    pub fn delete(&mut self, id: RecordId) -> IndexResult<Option<MovieRecord>> {
        let Some(record) = self.store.get(id).cloned() else {
            return Ok(None);
        };

        self.release_title(&record.title, id);
        if let Some(year) = record.year() {
            self.indexes.remove_year(year, id)?;
        }
        for genre in record.distinct_genres() {
            self.indexes.remove_genre(genre, id)?;
        }

        Ok(self.store.remove(id))
    }

    /// Drop `id`'s hold on `title`.
    ///
    /// If `id` owned the entry and other records still carry the title, the
    /// entry passes to the highest of their ids, as a rebuild would choose.
    fn release_title(&mut self, title: &str, id: RecordId) {
        if !self.indexes.remove_title(title, id) {
            return;
        }
        let heir = self
            .store
            .iter()
            .filter(|r| r.id != id && r.title == title)
            .map(|r| r.id)
            .max();
        if let Some(heir) = heir {
            self.indexes.add_title(title, heir);
        }
    }

    /// Apply `patch` to a record.
    ///
    /// Only the indexed fields whose value changes are re-indexed. Every
    /// field in the patch is then written to the record. Returns `None` if
    /// the id is absent.
    pub fn modify(&mut self, id: RecordId, patch: RecordPatch) -> QueryResult<Option<Modification>> {
        let Some(current) = self.store.get(id) else {
            return Ok(None);
        };

        if let Some(requested) = patch.id {
            if requested != id {
                return Err(QueryError::validation(format!(
                    "id cannot be changed (record {}, requested {})",
                    id, requested
                )));
            }
        }
        if let Some(release_date) = &patch.release_date {
            require_year(release_date)?;
        }

        let changes = changed_fields(current, &patch);
        let old = current.clone();

        if let Some(title) = patch.title.as_deref().filter(|t| *t != old.title) {
            self.release_title(&old.title, id);
            self.indexes.add_title(title, id);
        }

        if let Some(release_date) = &patch.release_date {
            let (before, after) = (old.year(), year_of(release_date));
            if before != after {
                if let Some(year) = before {
                    self.indexes.remove_year(year, id)?;
                }
                if let Some(year) = after {
                    self.indexes.add_year(year, id);
                }
            }
        }

        if let Some(genres) = &patch.genres {
            let before = old.distinct_genres();
            let after = distinct(genres);
            for genre in before.iter().filter(|g| !after.contains(*g)) {
                self.indexes.remove_genre(genre, id)?;
            }
            for genre in after.iter().filter(|g| !before.contains(*g)) {
                self.indexes.add_genre(genre, id);
            }
        }

        let record = self
            .store
            .get_mut(id)
            .ok_or_else(|| IndexError::invariant_violation(format!("record {} vanished during modify", id)))?;
        if let Some(title) = patch.title {
            record.title = title;
        }
        if let Some(release_date) = patch.release_date {
            record.release_date = release_date;
        }
        if let Some(genres) = patch.genres {
            record.genres = genres;
        }
        for (name, value) in patch.extra {
            record.extra.insert(name, value);
        }

        Ok(Some(Modification {
            title: record.title.clone(),
            changes,
        }))
    }

    /// Check that the store and all three indexes agree.
    ///
    /// - every title entry names a record carrying that title, and every
    ///   record's title is present
    /// - every record with a year sits exactly once in its year bucket, and
    ///   the year index holds nothing else
    /// - every record sits exactly once in the bucket of each of its
    ///   genres, and the genre index holds nothing else
    /// - all three trees are balanced and ordered
    pub fn verify(&self) -> IndexResult<()> {
        self.indexes.check_structure()?;

        for (title, &id) in self.indexes.title().iter() {
            match self.store.get(id) {
                Some(record) if record.title == *title => {}
                Some(record) => {
                    return Err(IndexError::invariant_violation(format!(
                        "{:?} maps to record {} titled {:?}",
                        title, id, record.title
                    ))
                    .in_index("title"))
                }
                None => {
                    return Err(IndexError::invariant_violation(format!(
                        "{:?} maps to missing record {}",
                        title, id
                    ))
                    .in_index("title"))
                }
            }
        }

        let mut year_members = 0;
        let mut genre_members = 0;
        for record in self.store.iter() {
            if !self.indexes.title().contains_key(record.title.as_str()) {
                return Err(IndexError::invariant_violation(format!(
                    "record {} title {:?} is not indexed",
                    record.id, record.title
                ))
                .in_index("title"));
            }

            if let Some(year) = record.year() {
                year_members += 1;
                if !bucket_contains(self.indexes.year().get(&year), record.id) {
                    return Err(IndexError::invariant_violation(format!(
                        "record {} missing from bucket {}",
                        record.id, year
                    ))
                    .in_index("year"));
                }
            }

            for genre in record.distinct_genres() {
                genre_members += 1;
                if !bucket_contains(self.indexes.genre().get(genre), record.id) {
                    return Err(IndexError::invariant_violation(format!(
                        "record {} missing from bucket {:?}",
                        record.id, genre
                    ))
                    .in_index("genre"));
                }
            }
        }

        let indexed_years: usize = self.indexes.year().values().map(Vec::len).sum();
        if indexed_years != year_members {
            return Err(IndexError::invariant_violation(format!(
                "{} memberships for {} dated records",
                indexed_years, year_members
            ))
            .in_index("year"));
        }

        let indexed_genres: usize = self.indexes.genre().values().map(Vec::len).sum();
        if indexed_genres != genre_members {
            return Err(IndexError::invariant_violation(format!(
                "{} memberships for {} record genres",
                indexed_genres, genre_members
            ))
            .in_index("genre"));
        }

        Ok(())
    }

    fn resolve(&self, id: RecordId, index: &'static str) -> IndexResult<&MovieRecord> {
        self.store.get(id).ok_or_else(|| {
            IndexError::invariant_violation(format!("indexed id {} has no record", id)).in_index(index)
        })
    }

    fn resolve_all(&self, ids: &[RecordId], index: &'static str) -> IndexResult<Vec<&MovieRecord>> {
        ids.iter().map(|&id| self.resolve(id, index)).collect()
    }
}

fn index_record(indexes: &mut IndexSet, record: &MovieRecord) {
    indexes.add_title(&record.title, record.id);
    if let Some(year) = record.year() {
        indexes.add_year(year, record.id);
    }
    for genre in record.distinct_genres() {
        indexes.add_genre(genre, record.id);
    }
}

fn require_year(release_date: &str) -> QueryResult<i32> {
    year_of(release_date).ok_or_else(|| {
        QueryError::validation(format!(
            "release_date {:?} must start with a four-digit year",
            release_date
        ))
    })
}

fn bucket_contains(bucket: Option<&Vec<RecordId>>, id: RecordId) -> bool {
    bucket.map_or(false, |ids| ids.contains(&id))
}

/// Fields of `patch` whose value differs from `record`
fn changed_fields(record: &MovieRecord, patch: &RecordPatch) -> Map<String, Value> {
    let mut changes = Map::new();
    if let Some(title) = patch.title.as_ref().filter(|t| **t != record.title) {
        changes.insert("title".to_string(), Value::from(title.as_str()));
    }
    if let Some(date) = patch.release_date.as_ref().filter(|d| **d != record.release_date) {
        changes.insert("release_date".to_string(), Value::from(date.as_str()));
    }
    if let Some(genres) = patch.genres.as_ref().filter(|g| **g != record.genres) {
        changes.insert("genres".to_string(), Value::from(genres.clone()));
    }
    for (name, value) in &patch.extra {
        if record.extra.get(name) != Some(value) {
            changes.insert(name.clone(), value.clone());
        }
    }
    changes
}
