//! Movie records
//!
//! Only four fields are interpreted: `id`, `title`, `release_date` and
//! `genres`. Everything else rides along in `extra` untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Record identifier, assigned by the store and never reused
pub type RecordId = u64;

/// Year of a `release_date`: its first four characters, all ASCII digits.
pub fn year_of(release_date: &str) -> Option<i32> {
    let digits = release_date.get(..4)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    /// Store-assigned identifier
    pub id: RecordId,
    /// Title, indexed exactly as written
    pub title: String,
    /// Year-leading date string such as `1999-03-31`
    pub release_date: String,
    /// Genres in their original order
    #[serde(default)]
    pub genres: Vec<String>,
    /// Uninterpreted attributes
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MovieRecord {
    /// Year derived from the release date
    pub fn year(&self) -> Option<i32> {
        year_of(&self.release_date)
    }

    /// Genres with repeats dropped, first occurrence kept
    pub fn distinct_genres(&self) -> Vec<&str> {
        distinct(&self.genres)
    }

    /// Look up any field by name, interpreted or not
    pub fn field(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::from(self.id)),
            "title" => Some(Value::from(self.title.as_str())),
            "release_date" => Some(Value::from(self.release_date.as_str())),
            "genres" => Some(Value::from(self.genres.clone())),
            other => self.extra.get(other).cloned(),
        }
    }
}

/// A record as submitted for insertion, before an id is assigned.
///
/// The interpreted fields are optional here so that absence can be
/// reported as a validation failure rather than a parse failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordDraft {
    /// Callers must not supply this; it is rejected if present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RecordDraft {
    /// Draft with the three required fields set
    pub fn new(title: impl Into<String>, release_date: impl Into<String>, genres: &[&str]) -> Self {
        Self {
            id: None,
            title: Some(title.into()),
            release_date: Some(release_date.into()),
            genres: Some(genres.iter().map(|g| g.to_string()).collect()),
            extra: Map::new(),
        }
    }

    /// Attach an uninterpreted attribute
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }
}

/// A partial update to an existing record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordPatch {
    /// Allowed only when equal to the record's current id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RecordPatch {
    /// Empty patch
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn release_date(mut self, release_date: impl Into<String>) -> Self {
        self.release_date = Some(release_date.into());
        self
    }

    pub fn genres(mut self, genres: &[&str]) -> Self {
        self.genres = Some(genres.iter().map(|g| g.to_string()).collect());
        self
    }

    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }
}

/// Drop repeated entries, keeping the first occurrence of each
pub fn distinct(values: &[String]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::with_capacity(values.len());
    for value in values {
        if !seen.contains(&value.as_str()) {
            seen.push(value);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_year_of() {
        assert_eq!(year_of("1999-03-31"), Some(1999));
        assert_eq!(year_of("2001"), Some(2001));
        assert_eq!(year_of("199"), None);
        assert_eq!(year_of(""), None);
        assert_eq!(year_of("abcd-01-01"), None);
        assert_eq!(year_of("é999"), None);
        assert_eq!(year_of("+199-01-01"), None);
        assert_eq!(year_of("-999"), None);
        assert_eq!(year_of(" 999"), None);
        assert_eq!(year_of("0042"), Some(42));
    }

    #[test]
    fn test_record_keeps_unknown_fields() {
        let record: MovieRecord = serde_json::from_value(json!({
            "id": 3,
            "title": "Heat",
            "release_date": "1995-12-15",
            "genres": ["Crime", "Drama"],
            "runtime": 170,
            "adult": false
        }))
        .unwrap();

        assert_eq!(record.year(), Some(1995));
        assert_eq!(record.extra["runtime"], json!(170));
        assert_eq!(record.field("runtime"), Some(json!(170)));
        assert_eq!(record.field("title"), Some(json!("Heat")));

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["adult"], json!(false));
    }

    #[test]
    fn test_distinct_genres() {
        let record = MovieRecord {
            id: 0,
            title: "X".into(),
            release_date: "2000".into(),
            genres: vec!["Drama".into(), "War".into(), "Drama".into()],
            extra: Map::new(),
        };
        assert_eq!(record.distinct_genres(), vec!["Drama", "War"]);
    }

    #[test]
    fn test_draft_detects_missing_fields() {
        let draft: RecordDraft = serde_json::from_value(json!({"title": "Alien", "budget": 11})).unwrap();
        assert_eq!(draft.title.as_deref(), Some("Alien"));
        assert!(draft.release_date.is_none());
        assert!(draft.genres.is_none());
        assert_eq!(draft.extra["budget"], json!(11));
    }

    #[test]
    fn test_patch_captures_id() {
        let patch: RecordPatch = serde_json::from_value(json!({"id": 9, "tagline": "x"})).unwrap();
        assert_eq!(patch.id, Some(9));
        assert_eq!(patch.extra["tagline"], json!("x"));
    }
}
