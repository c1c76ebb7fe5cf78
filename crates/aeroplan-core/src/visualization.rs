//! Rendered graph artifacts.

use crate::error::Result;
use crate::graph::GraphView;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque reference to a rendered graph, e.g. `/static/graph_<hex>.html`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisualizationHandle(String);

impl VisualizationHandle {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The artifact's file name (last path segment).
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for VisualizationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Renders graph views to artifacts that callers can display.
#[async_trait]
pub trait VisualizationStore: Send + Sync {
    /// Renders and writes the view under a fresh unique name.
    async fn save(&self, view: &GraphView) -> Result<VisualizationHandle>;
}
