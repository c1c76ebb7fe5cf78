//! Query intent produced by the router.

use crate::error::{AeroError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two downstream pipelines a question can be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intent {
    /// Answer from the knowledge graph (Cypher query + visualization).
    GraphRetrieval,
    /// Generate a new assembly plan with the design model.
    DesignGeneration,
}

impl Intent {
    /// Label the router model is instructed to answer with.
    pub fn label(self) -> &'static str {
        match self {
            Intent::GraphRetrieval => "graph",
            Intent::DesignGeneration => "design",
        }
    }

    /// Normalizes raw classifier output into an intent.
    ///
    /// Surrounding whitespace and quote characters are stripped and the
    /// remainder is compared case-insensitively against `graph` / `design`.
    /// Anything else is a classification fault.
    pub fn parse(raw: &str) -> Result<Self> {
        let normalized = raw
            .trim()
            .trim_matches(|c: char| c == '"' || c == '\'' || c == '`' || c.is_whitespace())
            .to_lowercase();

        match normalized.as_str() {
            "graph" => Ok(Intent::GraphRetrieval),
            "design" => Ok(Intent::DesignGeneration),
            _ => Err(AeroError::classification(raw.trim())),
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What the router does when the model answers with neither label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnrecognizedIntentPolicy {
    /// Fail the turn with a classification fault.
    #[default]
    Reject,
    /// Route to the knowledge graph, matching the prompt's stated default.
    FallbackToGraph,
}
