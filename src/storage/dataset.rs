//! JSON dataset loading
//!
//! A dataset is a JSON array of record objects. Objects without an `id`
//! take their position in the array as id, the way row numbers become ids
//! when a table is first ingested.

use std::fs;
use std::path::Path;

use serde_json::Value;

use super::errors::{StorageError, StorageResult};
use super::record::MovieRecord;

/// Read and parse a dataset file
pub fn load_dataset(path: &Path) -> StorageResult<Vec<MovieRecord>> {
    let content = fs::read_to_string(path).map_err(|e| StorageError::io_error(path, e))?;
    parse_dataset(&content)
}

/// Parse dataset text
pub fn parse_dataset(content: &str) -> StorageResult<Vec<MovieRecord>> {
    let value: Value = serde_json::from_str(content)
        .map_err(|e| StorageError::parse_error(format!("Invalid dataset JSON: {}", e)))?;

    let Value::Array(items) = value else {
        return Err(StorageError::parse_error("Dataset must be a JSON array of records"));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(position, item)| parse_item(position, item))
        .collect()
}

fn parse_item(position: usize, item: Value) -> StorageResult<MovieRecord> {
    let Value::Object(mut fields) = item else {
        return Err(StorageError::parse_error_at(position, "record is not a JSON object"));
    };

    if !fields.contains_key("id") {
        fields.insert("id".to_string(), Value::from(position as u64));
    }

    serde_json::from_value(Value::Object(fields))
        .map_err(|e| StorageError::parse_error_at(position, e.to_string()))
}
