//! Knowledge-graph domain module.
//!
//! # Module Structure
//!
//! - `record`: Query results and value rendering (`GraphQueryResult`, `Record`)
//! - `schema`: Record shape detection (`RecordSchema`, `ClassifiedRecords`)
//! - `view`: Node/edge graph built from records (`GraphView`, `build_graph_view`)
//! - `store`: Service traits for graph access (`GraphStore`, `GraphQueryService`)

mod record;
mod schema;
mod store;
mod view;

// Re-export public API
pub use record::{GraphQueryResult, Record, value_to_text};
pub use schema::{ClassifiedRecords, RecordSchema};
pub use store::{GraphQueryService, GraphSchema, GraphStore, RelationshipPattern};
pub use view::{EdgeStyle, GraphEdge, GraphNode, GraphView, NodeShape, NodeStyle, build_graph_view};
