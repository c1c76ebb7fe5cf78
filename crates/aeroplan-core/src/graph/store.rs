//! Graph access traits.

use super::record::GraphQueryResult;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A `(:From)-[:REL]->(:To)` pattern present in the graph.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RelationshipPattern {
    pub from: String,
    pub relationship: String,
    pub to: String,
}

/// Schema summary handed to the Cypher generation prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSchema {
    /// Node label to its property keys.
    pub node_properties: BTreeMap<String, Vec<String>>,
    /// Relationship type to its property keys.
    pub relationship_properties: BTreeMap<String, Vec<String>>,
    pub relationships: Vec<RelationshipPattern>,
}

impl GraphSchema {
    /// Removes node labels and relationship types that should not be queried.
    ///
    /// Relationship patterns touching an excluded label or type are removed too.
    pub fn without_types(mut self, excluded: &[String]) -> Self {
        let is_excluded = |name: &str| excluded.iter().any(|e| e == name);

        self.node_properties.retain(|label, _| !is_excluded(label));
        self.relationship_properties.retain(|rel, _| !is_excluded(rel));
        self.relationships.retain(|p| {
            !is_excluded(&p.from) && !is_excluded(&p.relationship) && !is_excluded(&p.to)
        });
        self
    }

    /// Plain-text rendering used inside prompts.
    pub fn to_prompt_text(&self) -> String {
        let mut out = String::from("Node properties:\n");
        for (label, props) in &self.node_properties {
            out.push_str(&format!("{} {{{}}}\n", label, props.join(", ")));
        }
        out.push_str("Relationship properties:\n");
        for (rel, props) in &self.relationship_properties {
            out.push_str(&format!("{} {{{}}}\n", rel, props.join(", ")));
        }
        out.push_str("The relationships:\n");
        for p in &self.relationships {
            out.push_str(&format!("(:{})-[:{}]->(:{})\n", p.from, p.relationship, p.to));
        }
        out
    }
}

/// Low-level access to a graph database.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Introspects labels, relationship types and their properties.
    async fn schema(&self) -> Result<GraphSchema>;

    /// Executes a Cypher statement and returns one JSON object per row,
    /// keyed by column name in column order.
    async fn run(&self, cypher: &str) -> Result<Vec<Value>>;
}

/// Natural language in, Cypher + records out.
#[async_trait]
pub trait GraphQueryService: Send + Sync {
    async fn query(&self, question: &str) -> Result<GraphQueryResult>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schema() -> GraphSchema {
        let mut schema = GraphSchema::default();
        schema
            .node_properties
            .insert("Operation".into(), vec!["name".into(), "duration".into()]);
        schema.node_properties.insert("Class".into(), vec!["uri".into()]);
        schema
            .relationship_properties
            .insert("isSubClassOf".into(), vec![]);
        schema.relationships.push(RelationshipPattern {
            from: "Operation".into(),
            relationship: "hasPredecessor".into(),
            to: "Operation".into(),
        });
        schema.relationships.push(RelationshipPattern {
            from: "Class".into(),
            relationship: "isSubClassOf".into(),
            to: "Class".into(),
        });
        schema
    }

    #[test]
    fn test_without_types_drops_excluded_entries() {
        let schema = sample_schema().without_types(&["Class".into(), "isSubClassOf".into()]);

        assert_eq!(schema.node_properties.len(), 1);
        assert!(schema.relationship_properties.is_empty());
        assert_eq!(schema.relationships.len(), 1);
        assert_eq!(schema.relationships[0].relationship, "hasPredecessor");
    }

    #[test]
    fn test_prompt_text_lists_patterns() {
        let text = sample_schema().without_types(&["Class".into()]).to_prompt_text();
        assert!(text.contains("Operation {name, duration}"));
        assert!(text.contains("(:Operation)-[:hasPredecessor]->(:Operation)"));
        assert!(!text.contains("Class {"));
    }
}
