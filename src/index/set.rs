//! The three secondary indexes kept alongside the record store
//!
//! - title: `String -> RecordId` (last writer wins on a shared title)
//! - year:  `i32 -> Vec<RecordId>`
//! - genre: `String -> Vec<RecordId>`
//!
//! Bucket-valued indexes never hold an empty bucket: the key is removed
//! together with its last id.

use serde::{Deserialize, Serialize};

use crate::storage::RecordId;

use super::avl::AvlTreeMap;
use super::errors::{IndexError, IndexResult};

/// Title, year and genre indexes.
///
/// Serializes as an object with the fixed keys `title`, `year` and `genre`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexSet {
    title: AvlTreeMap<String, RecordId>,
    year: AvlTreeMap<i32, Vec<RecordId>>,
    genre: AvlTreeMap<String, Vec<RecordId>>,
}

impl IndexSet {
    /// Creates an empty index set
    pub fn new() -> Self {
        Self::default()
    }

    /// Title index
    pub fn title(&self) -> &AvlTreeMap<String, RecordId> {
        &self.title
    }

    /// Year index
    pub fn year(&self) -> &AvlTreeMap<i32, Vec<RecordId>> {
        &self.year
    }

    /// Genre index
    pub fn genre(&self) -> &AvlTreeMap<String, Vec<RecordId>> {
        &self.genre
    }

    /// Map `title` to `id`. Returns the id previously stored under the title.
    pub fn add_title(&mut self, title: &str, id: RecordId) -> Option<RecordId> {
        self.title.put(title.to_string(), id)
    }

    /// Drop the title entry if it still points at `id`.
    ///
    /// Another record may have taken the title over since; its entry stays.
    pub fn remove_title(&mut self, title: &str, id: RecordId) -> bool {
        if self.title.get(title) == Some(&id) {
            self.title.remove(title);
            true
        } else {
            false
        }
    }

    /// Append `id` to the bucket for `year`, creating it if needed
    pub fn add_year(&mut self, year: i32, id: RecordId) {
        bucket_insert(&mut self.year, year, id);
    }

    /// Remove `id` from the bucket for `year`
    pub fn remove_year(&mut self, year: i32, id: RecordId) -> IndexResult<()> {
        bucket_remove(&mut self.year, &year, id).map_err(|e| e.in_index("year"))
    }

    /// Append `id` to the bucket for `genre`, creating it if needed
    pub fn add_genre(&mut self, genre: &str, id: RecordId) {
        match self.genre.get_mut(genre) {
            Some(ids) => push_unique(ids, id),
            None => {
                self.genre.put(genre.to_string(), vec![id]);
            }
        }
    }

    /// Remove `id` from the bucket for `genre`
    pub fn remove_genre(&mut self, genre: &str, id: RecordId) -> IndexResult<()> {
        bucket_remove(&mut self.genre, genre, id).map_err(|e| e.in_index("genre"))
    }

    /// Drop every entry from all three indexes
    pub fn clear(&mut self) {
        self.title.clear();
        self.year.clear();
        self.genre.clear();
    }

    /// Check tree invariants of all three indexes and bucket hygiene.
    pub fn check_structure(&self) -> IndexResult<()> {
        self.title.check_invariants().map_err(|e| e.in_index("title"))?;
        self.year.check_invariants().map_err(|e| e.in_index("year"))?;
        self.genre.check_invariants().map_err(|e| e.in_index("genre"))?;

        for (year, ids) in self.year.iter() {
            check_bucket(ids).map_err(|reason| {
                IndexError::invariant_violation(format!("bucket {} {}", year, reason)).in_index("year")
            })?;
        }
        for (genre, ids) in self.genre.iter() {
            check_bucket(ids).map_err(|reason| {
                IndexError::invariant_violation(format!("bucket {:?} {}", genre, reason))
                    .in_index("genre")
            })?;
        }
        Ok(())
    }
}

fn push_unique(ids: &mut Vec<RecordId>, id: RecordId) {
    if !ids.contains(&id) {
        ids.push(id);
    }
}

fn bucket_insert(tree: &mut AvlTreeMap<i32, Vec<RecordId>>, key: i32, id: RecordId) {
    match tree.get_mut(&key) {
        Some(ids) => push_unique(ids, id),
        None => {
            tree.put(key, vec![id]);
        }
    }
}

fn bucket_remove<K, Q>(tree: &mut AvlTreeMap<K, Vec<RecordId>>, key: &Q, id: RecordId) -> IndexResult<()>
where
    K: Ord + std::borrow::Borrow<Q>,
    Q: Ord + std::fmt::Debug + ?Sized,
{
    let Some(ids) = tree.get_mut(key) else {
        return Err(IndexError::invariant_violation(format!(
            "record {} expected under missing key {:?}",
            id, key
        )));
    };
    let Some(position) = ids.iter().position(|candidate| *candidate == id) else {
        return Err(IndexError::invariant_violation(format!(
            "record {} missing from bucket {:?}",
            id, key
        )));
    };

    ids.remove(position);
    if ids.is_empty() {
        tree.remove(key);
    }
    Ok(())
}

fn check_bucket(ids: &[RecordId]) -> Result<(), &'static str> {
    if ids.is_empty() {
        return Err("is empty");
    }
    for (i, id) in ids.iter().enumerate() {
        if ids[..i].contains(id) {
            return Err("holds a duplicate id");
        }
    }
    Ok(())
}
