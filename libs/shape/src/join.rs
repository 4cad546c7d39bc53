//! In-memory left outer join on one field.
//!
//! Used when subjects come from the local store and references come from a
//! sibling service, so the join can't happen in SQL.

use std::collections::HashMap;

use serde_json::Value;

use crate::record::Record;

/// Replace `subject[target]` with the first reference whose
/// `reference_id_field` equals it.
///
/// When nothing matches, or the subject has no `target`, the field is left
/// absent in the returned record. That signals "reference unavailable"
/// rather than an error.
#[must_use]
pub fn substitute_matching_reference(
    subject: &Record,
    target: &str,
    references: &[Record],
    reference_id_field: &str,
) -> Record {
    let matched = subject.get(target).and_then(|key| {
        references
            .iter()
            .find(|r| r.get(reference_id_field) == Some(key))
    });
    substitute(subject, target, matched)
}

/// [`substitute_matching_reference`] over many subjects.
///
/// References are indexed once up front; results are identical to the
/// element-wise form.
#[must_use]
pub fn substitute_matching_reference_in_array(
    subjects: &[Record],
    target: &str,
    references: &[Record],
    reference_id_field: &str,
) -> Vec<Record> {
    let mut index: HashMap<String, &Record> = HashMap::with_capacity(references.len());
    for reference in references {
        if let Some(id) = reference.get(reference_id_field) {
            index.entry(index_key(id)).or_insert(reference);
        }
    }

    subjects
        .iter()
        .map(|subject| {
            let matched = subject
                .get(target)
                .and_then(|key| index.get(&index_key(key)).copied());
            substitute(subject, target, matched)
        })
        .collect()
}

// Compact JSON text is equal exactly when the values are.
fn index_key(value: &Value) -> String {
    value.to_string()
}

fn substitute(subject: &Record, target: &str, matched: Option<&Record>) -> Record {
    let mut out = subject.clone();
    match matched {
        Some(reference) => {
            out.insert(target.to_owned(), Value::Object(reference.clone()));
        }
        None => {
            out.remove(target);
        }
    }
    out
}
