//! CypherQaService - Natural language to Cypher to records.
//!
//! The graph schema is introspected once per service, filtered by the
//! configured excluded types and handed to the Cypher generation prompt.

use crate::prompts::{CYPHER_GENERATION_PROMPT, render_prompt};
use aeroplan_core::config::{GraphConfig, LlmConfig};
use aeroplan_core::graph::{GraphQueryResult, GraphQueryService, GraphStore};
use aeroplan_core::llm::{CompletionRequest, LlmClient};
use aeroplan_core::{AeroError, Result};
use async_trait::async_trait;
use minijinja::context;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tokio::sync::OnceCell;

static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```[A-Za-z]*\s*(.*?)```").expect("valid code fence regex"));
static LEADING_KEYWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^cypher\s+").expect("valid keyword regex"));

pub struct CypherQaService {
    llm: Arc<dyn LlmClient>,
    store: Arc<dyn GraphStore>,
    model: String,
    temperature: Option<f32>,
    exclude_types: Vec<String>,
    top_k: usize,
    schema_text: OnceCell<String>,
}

impl CypherQaService {
    pub fn new(llm: Arc<dyn LlmClient>, store: Arc<dyn GraphStore>, model: impl Into<String>) -> Self {
        Self {
            llm,
            store,
            model: model.into(),
            temperature: None,
            exclude_types: Vec::new(),
            top_k: GraphConfig::default().top_k,
            schema_text: OnceCell::new(),
        }
    }

    pub fn from_config(
        llm: Arc<dyn LlmClient>,
        store: Arc<dyn GraphStore>,
        llm_config: &LlmConfig,
        graph_config: &GraphConfig,
    ) -> Self {
        let mut service = Self::new(llm, store, llm_config.cypher_model.clone());
        service.temperature = llm_config.temperature;
        service.exclude_types = graph_config.exclude_types.clone();
        service.top_k = graph_config.top_k;
        service
    }

    pub fn with_exclude_types(mut self, exclude_types: Vec<String>) -> Self {
        self.exclude_types = exclude_types;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Schema text, introspected on first use.
    async fn schema_text(&self) -> Result<&str> {
        let text = self
            .schema_text
            .get_or_try_init(|| async {
                let schema = self.store.schema().await?;
                Ok::<_, AeroError>(schema.without_types(&self.exclude_types).to_prompt_text())
            })
            .await?;
        Ok(text.as_str())
    }

    async fn generate_cypher(&self, question: &str) -> Result<String> {
        let schema = self.schema_text().await?;
        let prompt = render_prompt(
            CYPHER_GENERATION_PROMPT,
            context! { schema => schema, question => question },
        )?;
        let request =
            CompletionRequest::new(self.model.clone(), prompt).with_temperature(self.temperature);
        let raw = self.llm.complete(request).await?;

        let cypher = clean_cypher(&raw);
        if cypher.is_empty() {
            return Err(AeroError::retrieval("Model returned an empty Cypher statement"));
        }
        Ok(cypher)
    }
}

#[async_trait]
impl GraphQueryService for CypherQaService {
    async fn query(&self, question: &str) -> Result<GraphQueryResult> {
        let cypher = self.generate_cypher(question).await?;
        tracing::info!("[CypherQa] Generated Cypher: {}", cypher);

        let mut records = self.store.run(&cypher).await?;
        if records.len() > self.top_k {
            tracing::debug!(
                "[CypherQa] Truncating {} records to {}",
                records.len(),
                self.top_k
            );
            records.truncate(self.top_k);
        }
        Ok(GraphQueryResult::new(cypher, records))
    }
}

/// Strips markdown code fences and a leading `cypher` language tag.
fn clean_cypher(raw: &str) -> String {
    let body = CODE_FENCE
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map_or(raw, |m| m.as_str())
        .trim();
    LEADING_KEYWORD.replace(body, "").trim().to_string()
}
