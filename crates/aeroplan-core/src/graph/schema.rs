//! Record shape detection.
//!
//! Graph query results have no fixed schema. The first record decides how
//! the whole list is turned into nodes and edges:
//!
//! | Schema | First record | Construction |
//! |--------|--------------|--------------|
//! | A | empty list, not an object, or anything unmatched | every nested object is a node |
//! | B | two flat fields | source → target |
//! | C | exactly one nested object and ≥3 fields | node → related value, labelled edge |
//! | D | ≥3 flat fields | (source, target, label) |

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Shape of a graph query result list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordSchema {
    /// Catch-all: nested node objects, no edges.
    A,
    /// Flat `(source, target)` pairs.
    B,
    /// One nested node object plus a related value and an optional edge label.
    C,
    /// Flat `(source, target, label)` triples.
    D,
}

impl RecordSchema {
    /// Classifies a record list by inspecting its first record.
    pub fn detect(records: &[Value]) -> Self {
        let Some(Value::Object(sample)) = records.first() else {
            return RecordSchema::A;
        };

        let nested = sample.values().filter(|v| v.is_object()).count();
        match (nested, sample.len()) {
            (1, len) if len >= 3 => RecordSchema::C,
            (0, 2) => RecordSchema::B,
            (0, len) if len >= 3 => RecordSchema::D,
            _ => RecordSchema::A,
        }
    }
}

/// Records tagged with their detected schema.
#[derive(Debug, Clone, Copy)]
pub struct ClassifiedRecords<'a> {
    pub schema: RecordSchema,
    pub records: &'a [Value],
}

impl<'a> ClassifiedRecords<'a> {
    pub fn classify(records: &'a [Value]) -> Self {
        Self {
            schema: RecordSchema::detect(records),
            records,
        }
    }

    /// Field names of the first record, in column order.
    pub fn sample_fields(&self) -> Vec<&'a str> {
        match self.records.first() {
            Some(Value::Object(sample)) => sample.keys().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// Name of the first nested-object field of the first record.
    pub fn nested_field(&self) -> Option<&'a str> {
        match self.records.first() {
            Some(Value::Object(sample)) => sample
                .iter()
                .find(|(_, v)| v.is_object())
                .map(|(k, _)| k.as_str()),
            _ => None,
        }
    }
}
