//! Application configuration model.
//!
//! Loaded from `config.toml` by the infrastructure layer; every section and
//! field is optional and falls back to the defaults below.

use crate::intent::UnrecognizedIntentPolicy;
use crate::session::DEFAULT_MEMORY_WINDOW;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub graph: GraphConfig,
    pub artifacts: ArtifactConfig,
    pub memory: MemoryConfig,
}

/// LLM endpoint and per-stage model selection.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LlmConfig {
    /// OpenAI-compatible API root, e.g. `https://api.openai.com/v1`
    pub base_url: String,
    /// Usually supplied through `OPENAI_API_KEY`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub router_model: String,
    pub cypher_model: String,
    pub graph_answer_model: String,
    pub design_model: String,
    /// Sampling temperature for every stage; omitted from requests when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    pub unrecognized_intent: UnrecognizedIntentPolicy,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            router_model: "gpt-4".to_string(),
            cypher_model: "gpt-4".to_string(),
            graph_answer_model: "gpt-4o".to_string(),
            design_model: "o1".to_string(),
            temperature: Some(0.0),
            unrecognized_intent: UnrecognizedIntentPolicy::default(),
        }
    }
}

/// Knowledge-graph connection and query limits.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GraphConfig {
    /// HTTP root of the Neo4j server, e.g. `http://localhost:7474`
    pub uri: String,
    pub database: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Maximum number of records kept from a query
    pub top_k: usize,
    /// Labels and relationship types hidden from Cypher generation
    pub exclude_types: Vec<String>,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: "http://localhost:7474".to_string(),
            database: "neo4j".to_string(),
            username: "neo4j".to_string(),
            password: None,
            top_k: 300,
            exclude_types: [
                "Class",
                "Relationship",
                "_GraphConfig",
                "SCO_RESTRICTION",
                "DOMAIN",
                "RANGE",
                "isSubClassOf",
                "isSubPropertyOf",
                "hasOptionalAutoOperation",
                "hasOptionalManualOperation",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

/// Where generated artifacts are written.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ArtifactConfig {
    /// Directory for `graph_<hex>.html` files
    pub static_dir: PathBuf,
    /// URL prefix for visualization handles
    pub static_url_prefix: String,
    /// Directory for `assembly_plan_<timestamp>.csv` files
    pub plans_dir: PathBuf,
    /// Age in seconds after which visualizations are swept
    pub retention_secs: u64,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            static_dir: PathBuf::from("static"),
            static_url_prefix: "/static".to_string(),
            plans_dir: PathBuf::from("./plans"),
            retention_secs: 3600,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct MemoryConfig {
    /// Number of turns kept as conversation context
    pub window: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_MEMORY_WINDOW,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.graph.top_k, 300);
        assert_eq!(config.artifacts.retention_secs, 3600);
        assert_eq!(config.memory.window, 10);
        assert_eq!(config.llm.design_model, "o1");
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [llm]
            design_model = "gpt-4o"
            unrecognized_intent = "fallback_to_graph"

            [graph]
            uri = "http://kg.local:7474"
            exclude_types = []
            "#,
        )
        .unwrap();

        assert_eq!(config.llm.design_model, "gpt-4o");
        assert_eq!(config.llm.router_model, "gpt-4");
        assert_eq!(
            config.llm.unrecognized_intent,
            UnrecognizedIntentPolicy::FallbackToGraph
        );
        assert_eq!(config.graph.uri, "http://kg.local:7474");
        assert!(config.graph.exclude_types.is_empty());
        assert_eq!(config.graph.database, "neo4j");
    }
}
