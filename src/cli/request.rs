//! Request model shared by the one-shot commands and the serve loop
//!
//! A request is a JSON object tagged by `op`:
//!
//! ```json
//! {"op": "years", "from": 1990, "to": 1999}
//! {"op": "insert", "record": {"title": "Heat", "release_date": "1995-12-15", "genres": ["Crime"]}}
//! {"op": "modify", "id": 12, "changes": {"genres": ["Drama"]}}
//! ```

use serde::Deserialize;
use serde_json::{json, Value};

use crate::graph::CoOccurrenceGraph;
use crate::query::{QueryEngine, QueryResult};
use crate::storage::{MovieRecord, RecordDraft, RecordId, RecordPatch};

use super::errors::{CliError, CliResult};

/// One operation against the catalog
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    Get { id: RecordId },
    Title { title: String },
    Prefix { prefix: String },
    Year { year: i32 },
    Years { from: i32, to: i32 },
    Genre { genre: String },
    Range { field: String, min: f64, max: f64 },
    Insert { record: RecordDraft },
    Modify { id: RecordId, changes: RecordPatch },
    Delete { id: RecordId },
    Path { attribute: String, from: String, to: String },
    Stats,
    Verify,
}

impl Request {
    /// Parse a request line
    pub fn parse(line: &str) -> CliResult<Self> {
        serde_json::from_str(line).map_err(|e| CliError::bad_request(format!("Invalid request: {}", e)))
    }

    /// Run against `engine`, producing the response data
    pub fn execute(self, engine: &QueryEngine) -> QueryResult<Value> {
        match self {
            Request::Get { id } => Ok(to_value(engine.search_by_id(id)?)),
            Request::Title { title } => Ok(to_value(engine.search_by_title(&title)?)),
            Request::Prefix { prefix } => Ok(records(engine.search_by_prefix(&prefix)?)),
            Request::Year { year } => Ok(records(engine.search_by_year(year)?)),
            Request::Years { from, to } => Ok(records(engine.search_by_year_range(from, to)?)),
            Request::Genre { genre } => Ok(records(engine.search_by_genre(&genre)?)),
            Request::Range { field, min, max } => Ok(records(engine.range_query(&field, min, max)?)),
            Request::Insert { record } => Ok(json!({"id": engine.insert(record)?})),
            Request::Modify { id, changes } => Ok(json!({"modified": engine.modify(id, changes)?})),
            Request::Delete { id } => Ok(json!({"deleted": engine.delete(id)?})),
            Request::Path { attribute, from, to } => {
                let all = engine.records()?;
                let graph = CoOccurrenceGraph::from_records(&all, &attribute);
                Ok(json!({"path": graph.shortest_path(&from, &to)}))
            }
            Request::Stats => Ok(json!(engine.stats()?)),
            Request::Verify => {
                engine.verify()?;
                Ok(json!({"verified": true}))
            }
        }
    }
}

fn to_value(record: Option<MovieRecord>) -> Value {
    json!(record)
}

fn records(records: Vec<MovieRecord>) -> Value {
    json!({"count": records.len(), "records": records})
}
