//! Graph query results.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single result row: field name to value, in column order.
pub type Record = serde_json::Map<String, Value>;

/// Output of the graph pipeline for one question.
///
/// `records` keeps raw JSON values: the shape is not fixed, and rows that
/// are not objects must still be representable so the formatter can skip
/// them instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphQueryResult {
    /// The Cypher statement that produced the records.
    pub cypher: String,
    /// Result rows in query order.
    pub records: Vec<Value>,
}

impl GraphQueryResult {
    pub fn new(cypher: impl Into<String>, records: Vec<Value>) -> Self {
        Self {
            cypher: cypher.into(),
            records,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records rendered as compact JSON for prompt context.
    pub fn records_json(&self) -> String {
        serde_json::to_string(&self.records).unwrap_or_else(|_| "[]".to_string())
    }
}

/// Renders a value as node or edge text.
///
/// Strings are used verbatim, `null` becomes empty, everything else is
/// rendered as JSON.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_to_text() {
        assert_eq!(value_to_text(&json!("Crane")), "Crane");
        assert_eq!(value_to_text(&json!(42)), "42");
        assert_eq!(value_to_text(&json!(true)), "true");
        assert_eq!(value_to_text(&Value::Null), "");
        assert_eq!(value_to_text(&json!(["a"])), "[\"a\"]");
    }

    #[test]
    fn test_records_json_keeps_field_order() {
        let result = GraphQueryResult::new(
            "MATCH (o)-[:hasPredecessor]->(p) RETURN o.name, p.name",
            vec![json!({"o.name": "Drilling", "p.name": "JigIn"})],
        );
        assert_eq!(
            result.records_json(),
            r#"[{"o.name":"Drilling","p.name":"JigIn"}]"#
        );
    }
}
