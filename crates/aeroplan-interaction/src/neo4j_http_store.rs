//! Neo4jHttpStore - Graph store backed by the Neo4j HTTP transactional API.
//!
//! Statements are sent to `/db/<database>/tx/commit` and results are
//! requested in `row` format, so node values arrive as plain property maps.

use aeroplan_core::config::GraphConfig;
use aeroplan_core::graph::{GraphSchema, GraphStore, RelationshipPattern};
use aeroplan_core::{AeroError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const NODE_PROPERTIES_QUERY: &str = "CALL db.schema.nodeTypeProperties() \
     YIELD nodeLabels, propertyName \
     UNWIND nodeLabels AS label \
     RETURN label, collect(DISTINCT propertyName) AS properties";

const REL_PROPERTIES_QUERY: &str = "CALL db.schema.relTypeProperties() \
     YIELD relType, propertyName \
     RETURN relType, collect(DISTINCT propertyName) AS properties";

const RELATIONSHIPS_QUERY: &str = "MATCH (a)-[r]->(b) \
     WITH DISTINCT labels(a) AS froms, type(r) AS rel, labels(b) AS tos \
     UNWIND froms AS source UNWIND tos AS target \
     RETURN DISTINCT source, rel, target";

/// Graph store speaking the Neo4j HTTP API.
#[derive(Clone)]
pub struct Neo4jHttpStore {
    client: Client,
    endpoint: String,
    username: String,
    password: Option<String>,
}

impl Neo4jHttpStore {
    pub fn new(uri: &str, database: &str, username: impl Into<String>, password: Option<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: format!("{}/db/{}/tx/commit", uri.trim_end_matches('/'), database),
            username: username.into(),
            password,
        }
    }

    /// Builds a store from the `[graph]` configuration section.
    pub fn from_config(config: &GraphConfig) -> Self {
        Self::new(
            &config.uri,
            &config.database,
            config.username.clone(),
            config.password.clone(),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Runs statements in one auto-commit transaction, results in statement order.
    async fn run_statements(&self, statements: &[&str]) -> Result<Vec<StatementResult>> {
        let body = TxRequest {
            statements: statements
                .iter()
                .map(|s| Statement {
                    statement: *s,
                    result_data_contents: ["row"],
                })
                .collect(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .basic_auth(&self.username, self.password.as_ref())
            .json(&body)
            .send()
            .await
            .map_err(|err| AeroError::retrieval(format!("Neo4j request failed: {err}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| AeroError::retrieval(format!("Failed to read Neo4j response: {err}")))?;

        if !status.is_success() {
            return Err(AeroError::retrieval(format!(
                "Neo4j returned {}: {}",
                status.as_u16(),
                text
            )));
        }

        parse_tx_response(&text)
    }
}

#[async_trait]
impl GraphStore for Neo4jHttpStore {
    async fn schema(&self) -> Result<GraphSchema> {
        let results = self
            .run_statements(&[NODE_PROPERTIES_QUERY, REL_PROPERTIES_QUERY, RELATIONSHIPS_QUERY])
            .await?;
        let [nodes, rels, patterns] = <[StatementResult; 3]>::try_from(results)
            .map_err(|r| AeroError::retrieval(format!("Expected 3 schema results, got {}", r.len())))?;

        let mut schema = GraphSchema::default();
        for row in nodes.data {
            if let [Value::String(label), props] = &row.row[..] {
                schema.node_properties.insert(label.clone(), string_list(props));
            }
        }
        for row in rels.data {
            if let [Value::String(rel), props] = &row.row[..] {
                let rel = rel.trim_start_matches(':').trim_matches('`').to_string();
                schema.relationship_properties.insert(rel, string_list(props));
            }
        }
        for row in patterns.data {
            if let [Value::String(from), Value::String(rel), Value::String(to)] = &row.row[..] {
                schema.relationships.push(RelationshipPattern {
                    from: from.clone(),
                    relationship: rel.clone(),
                    to: to.clone(),
                });
            }
        }
        schema.relationships.sort();

        tracing::debug!(
            "[Neo4jHttpStore] Schema has {} labels and {} relationship patterns",
            schema.node_properties.len(),
            schema.relationships.len()
        );
        Ok(schema)
    }

    async fn run(&self, cypher: &str) -> Result<Vec<Value>> {
        tracing::debug!("[Neo4jHttpStore] Running Cypher: {}", cypher);
        let results = self.run_statements(&[cypher]).await?;
        Ok(results
            .into_iter()
            .next()
            .map(StatementResult::into_records)
            .unwrap_or_default())
    }
}

#[derive(Serialize)]
struct TxRequest<'a> {
    statements: Vec<Statement<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Statement<'a> {
    statement: &'a str,
    result_data_contents: [&'static str; 1],
}

#[derive(Deserialize)]
struct TxResponse {
    #[serde(default)]
    results: Vec<StatementResult>,
    #[serde(default)]
    errors: Vec<TxError>,
}

#[derive(Debug, Deserialize)]
struct StatementResult {
    columns: Vec<String>,
    #[serde(default)]
    data: Vec<RowData>,
}

impl StatementResult {
    /// One JSON object per row, keyed by column name in column order.
    fn into_records(self) -> Vec<Value> {
        let columns = self.columns;
        self.data
            .into_iter()
            .map(|row| {
                let record: Map<String, Value> = columns.iter().cloned().zip(row.row).collect();
                Value::Object(record)
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct RowData {
    row: Vec<Value>,
}

#[derive(Deserialize)]
struct TxError {
    code: String,
    message: String,
}

fn parse_tx_response(body: &str) -> Result<Vec<StatementResult>> {
    let response: TxResponse = serde_json::from_str(body)
        .map_err(|err| AeroError::retrieval(format!("Malformed Neo4j response: {err}")))?;

    if let Some(error) = response.errors.first() {
        return Err(AeroError::retrieval(format!("{}: {}", error.code, error.message)));
    }
    Ok(response.results)
}

fn string_list(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}
