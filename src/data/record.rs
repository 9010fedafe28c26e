use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// One candidate entry as returned by the data service.
///
/// Field sets differ between records; no field is guaranteed to be present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl Record {
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Build a record from a JSON object literal, ignoring anything that is not an object
    pub fn from_json(id: impl Into<String>, fields: Value) -> Self {
        let fields = match fields {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self::new(id, fields)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// True when at least one field carries a meaningful value
    pub fn has_content(&self) -> bool {
        self.fields.values().any(|v| !is_empty_value(v))
    }
}

/// Emptiness rule shared by the detail view and the empty-row filter:
/// null, whitespace-only strings, empty arrays and empty objects carry no content.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Remove records whose every field is empty
pub fn drop_empty_records(records: Vec<Record>) -> Vec<Record> {
    let before = records.len();
    let kept: Vec<Record> = records.into_iter().filter(Record::has_content).collect();
    if kept.len() != before {
        tracing::debug!(
            target: "fetch",
            "Dropped {} empty records ({} kept)",
            before - kept.len(),
            kept.len()
        );
    }
    kept
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecordFile {
    Page { records: Vec<Record> },
    Bare(Vec<Record>),
}

/// Load records from a JSON file holding either a service page
/// (`{"records": [...]}`) or a bare array of records.
pub fn load_records_file(path: &Path) -> Result<Vec<Record>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read records file {}", path.display()))?;
    let parsed: RecordFile = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse records file {}", path.display()))?;
    let records = match parsed {
        RecordFile::Page { records } => records,
        RecordFile::Bare(records) => records,
    };
    tracing::info!(target: "fetch", "Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}
