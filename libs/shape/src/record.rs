//! Structural helpers for loosely-typed JSON records.
//!
//! Every operation returns fresh values and leaves its inputs untouched.
//! A missing field means "nothing to do", never an error.

use std::collections::HashSet;
use std::hash::Hash;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// A JSON object as returned by the store or by a sibling service.
pub type Record = Map<String, Value>;

/// Identity field of embedded sub-objects.
pub const ID_FIELD: &str = "id";

/// Structural input that isn't shaped like a record.
#[derive(Debug, Error)]
pub enum ShapeError {
    #[error("expected a JSON object at index {index}, got {kind}")]
    NotAnObject { index: usize, kind: &'static str },

    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Serialize typed rows into records.
///
/// # Errors
/// Returns [`ShapeError::NotAnObject`] when an item doesn't serialize to a
/// JSON object, or [`ShapeError::Serialize`] when serialization itself fails.
pub fn to_records<T: Serialize>(items: &[T]) -> Result<Vec<Record>, ShapeError> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| match serde_json::to_value(item)? {
            Value::Object(map) => Ok(map),
            other => Err(ShapeError::NotAnObject {
                index,
                kind: kind_of(&other),
            }),
        })
        .collect()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Distinct values of `field` across `records`, in first-occurrence order.
///
/// Records lacking the field contribute a single `Value::Null`.
#[must_use]
pub fn extract_unique_key(field: &str, records: &[Record]) -> Vec<Value> {
    let mut out: Vec<Value> = Vec::new();
    for record in records {
        let value = record.get(field).cloned().unwrap_or(Value::Null);
        if !out.contains(&value) {
            out.push(value);
        }
    }
    out
}

/// Typed counterpart of [`extract_unique_key`].
pub fn extract_unique_by<T, K, F>(items: &[T], mut key: F) -> Vec<K>
where
    K: Eq + Hash + Clone,
    F: FnMut(&T) -> K,
{
    let mut seen = HashSet::with_capacity(items.len());
    items
        .iter()
        .map(&mut key)
        .filter(|k| seen.insert(k.clone()))
        .collect()
}

/// Copy of `record` with the value of `old` stored under `new`.
#[must_use]
pub fn rename_field(record: &Record, old: &str, new: &str) -> Record {
    let mut out = record.clone();
    if let Some(value) = out.remove(old) {
        out.insert(new.to_owned(), value);
    }
    out
}

/// [`rename_field`] applied element-wise.
#[must_use]
pub fn rename_field_in_array(records: &[Record], old: &str, new: &str) -> Vec<Record> {
    records.iter().map(|r| rename_field(r, old, new)).collect()
}

/// Copies of `records` without `field`.
#[must_use]
pub fn delete_field(records: &[Record], field: &str) -> Vec<Record> {
    records
        .iter()
        .map(|r| {
            let mut out = r.clone();
            out.remove(field);
            out
        })
        .collect()
}

/// Copy of `record` without any of `fields`.
#[must_use]
pub fn exclude(record: &Record, fields: &[&str]) -> Record {
    record
        .iter()
        .filter(|(k, _)| !fields.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Copy of `record` without `null` entries.
#[must_use]
pub fn clean(record: &Record) -> Record {
    record
        .iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Whether `record` carries at least one of `fields`.
#[must_use]
pub fn contains_any(record: &Record, fields: &[&str]) -> bool {
    fields.iter().any(|f| record.contains_key(*f))
}

/// Copy of `record` restricted to `fields`.
#[must_use]
pub fn filter_object(fields: &[&str], record: &Record) -> Record {
    fields
        .iter()
        .filter_map(|f| record.get(*f).map(|v| ((*f).to_owned(), v.clone())))
        .collect()
}

/// Collect the `key` sub-object of every record, keeping the first one seen
/// per `id`. Records without the sub-object are skipped.
#[must_use]
pub fn dedupe_by_identity(records: &[Record], key: &str) -> Vec<Value> {
    let mut out: Vec<Value> = Vec::new();
    for nested in records.iter().filter_map(|r| r.get(key)) {
        if nested.is_null() {
            continue;
        }
        let id = nested.get(ID_FIELD);
        if !out.iter().any(|seen| seen.get(ID_FIELD) == id) {
            out.push(nested.clone());
        }
    }
    out
}
