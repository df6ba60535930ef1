//! Record storage for reeldb
//!
//! The record store is the single source of truth for record content.
//! Indexes hold ids only and resolve them here.
//!
//! # Design Principles
//!
//! - Ids are assigned by the store from a forward-only counter
//! - Only `title`, `release_date` and `genres` are interpreted
//! - All other attributes pass through untouched
//!
//! Datasets are JSON arrays of record objects; see [`load_dataset`].

mod dataset;
mod errors;
mod record;
mod store;

pub use dataset::{load_dataset, parse_dataset};
pub use errors::{Severity, StorageError, StorageErrorCode, StorageResult};
pub use record::{distinct, year_of, MovieRecord, RecordDraft, RecordId, RecordPatch};
pub use store::{initial_next_id, RecordStore};
