//! Node/edge view built from graph query records.

use super::record::value_to_text;
use super::schema::{ClassifiedRecords, RecordSchema};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use uuid::Uuid;

const PRIMARY_COLOR: &str = "#97c2fc";
const TARGET_COLOR: &str = "#fc9797";
const EDGE_COLOR: &str = "#666666";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeShape {
    Box,
    Diamond,
}

/// Color and shape of a rendered node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NodeStyle {
    pub color: &'static str,
    pub shape: NodeShape,
}

impl NodeStyle {
    /// Source / standalone nodes.
    pub const PRIMARY: NodeStyle = NodeStyle {
        color: PRIMARY_COLOR,
        shape: NodeShape::Box,
    };
    /// Target nodes of flat pairs.
    pub const TARGET: NodeStyle = NodeStyle {
        color: TARGET_COLOR,
        shape: NodeShape::Box,
    };
    /// Values related to a nested node object.
    pub const RELATED: NodeStyle = NodeStyle {
        color: TARGET_COLOR,
        shape: NodeShape::Diamond,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EdgeStyle {
    pub color: &'static str,
}

impl Default for EdgeStyle {
    fn default() -> Self {
        Self { color: EDGE_COLOR }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    #[serde(flatten)]
    pub style: NodeStyle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(flatten)]
    pub style: EdgeStyle,
}

/// Directed graph ready for rendering.
///
/// Node ids are unique: the first node added under an id wins and later
/// additions with the same id are ignored, whatever their label or style.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GraphView {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    #[serde(skip)]
    seen: HashSet<String>,
}

impl GraphView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node unless one with the same id exists. Returns whether it was added.
    pub fn add_node_if_absent(
        &mut self,
        id: impl Into<String>,
        label: Option<String>,
        style: NodeStyle,
    ) -> bool {
        let id = id.into();
        if self.seen.contains(&id) {
            return false;
        }
        self.seen.insert(id.clone());
        self.nodes.push(GraphNode {
            label: label.unwrap_or_else(|| id.clone()),
            id,
            style,
        });
        true
    }

    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>, label: Option<String>) {
        self.edges.push(GraphEdge {
            from: from.into(),
            to: to.into(),
            label: label.filter(|l| !l.is_empty()),
            style: EdgeStyle::default(),
        });
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Builds the node/edge view for a record list.
///
/// Never panics: records that are not objects, missing fields and empty
/// node ids are skipped.
pub fn build_graph_view(records: &[Value]) -> GraphView {
    let classified = ClassifiedRecords::classify(records);
    let mut view = GraphView::new();

    tracing::debug!(
        "[GraphFormatter] {} records classified as schema {:?}",
        records.len(),
        classified.schema
    );

    match classified.schema {
        RecordSchema::A => add_node_maps(&mut view, classified),
        RecordSchema::B => add_pairs(&mut view, classified),
        RecordSchema::C => add_anchored_relations(&mut view, classified),
        RecordSchema::D => add_triples(&mut view, classified),
    }

    view
}

fn add_node_maps(view: &mut GraphView, classified: ClassifiedRecords<'_>) {
    for record in classified.records.iter().filter_map(Value::as_object) {
        for value in record.values() {
            if let Value::Object(node) = value {
                add_object_node(view, node);
            }
        }
    }
}

fn add_pairs(view: &mut GraphView, classified: ClassifiedRecords<'_>) {
    let fields = classified.sample_fields();
    let [source_field, target_field] = fields[..] else {
        return;
    };

    for record in classified.records.iter().filter_map(Value::as_object) {
        let source = field_text(record, source_field);
        let target = field_text(record, target_field);
        if source.is_empty() || target.is_empty() {
            continue;
        }
        view.add_node_if_absent(source.clone(), None, NodeStyle::PRIMARY);
        view.add_node_if_absent(target.clone(), None, NodeStyle::TARGET);
        view.add_edge(source, target, None);
    }
}

fn add_anchored_relations(view: &mut GraphView, classified: ClassifiedRecords<'_>) {
    let Some(nested_field) = classified.nested_field() else {
        return;
    };

    for record in classified.records.iter().filter_map(Value::as_object) {
        let Some(Value::Object(node)) = record.get(nested_field) else {
            continue;
        };
        let primary = add_object_node(view, node);

        let mut others = record.keys().filter(|k| k.as_str() != nested_field);
        let Some(related_field) = others.next() else {
            continue;
        };
        let related = field_text(record, related_field);
        if related.is_empty() {
            continue;
        }
        view.add_node_if_absent(related.clone(), None, NodeStyle::RELATED);

        let relation = others.next().map(|field| field_text(record, field));
        view.add_edge(primary, related, relation);
    }
}

fn add_triples(view: &mut GraphView, classified: ClassifiedRecords<'_>) {
    let fields = classified.sample_fields();
    let [source_field, target_field, relation_field, ..] = fields[..] else {
        return;
    };

    for record in classified.records.iter().filter_map(Value::as_object) {
        let source = field_text(record, source_field);
        let target = field_text(record, target_field);
        if source.is_empty() || target.is_empty() {
            continue;
        }
        let relation = field_text(record, relation_field);
        view.add_node_if_absent(source.clone(), None, NodeStyle::PRIMARY);
        view.add_node_if_absent(target.clone(), None, NodeStyle::PRIMARY);
        view.add_edge(source, target, Some(relation));
    }
}

/// Adds a node for a nested object and returns its id.
fn add_object_node(view: &mut GraphView, node: &serde_json::Map<String, Value>) -> String {
    let id = node
        .get("name")
        .map(value_to_text)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    view.add_node_if_absent(id.clone(), Some(attribute_label(node)), NodeStyle::PRIMARY);
    id
}

/// `name` on the first line, then one `key: value` line per other attribute.
fn attribute_label(node: &serde_json::Map<String, Value>) -> String {
    let name = node
        .get("name")
        .map(value_to_text)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "Node".to_string());
    let attrs: Vec<String> = node
        .iter()
        .filter(|(k, _)| k.as_str() != "name")
        .map(|(k, v)| format!("{}: {}", k, value_to_text(v)))
        .collect();

    if attrs.is_empty() {
        name
    } else {
        format!("{}\n{}", name, attrs.join("\n"))
    }
}

fn field_text(record: &serde_json::Map<String, Value>, field: &str) -> String {
    record.get(field).map(value_to_text).unwrap_or_default()
}
