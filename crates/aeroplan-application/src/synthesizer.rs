//! Response synthesizers for the graph and design pipelines.
//!
//! Both render a fixed prompt and return the model's token stream. Empty
//! deltas are dropped so every yielded token carries text.

use crate::prompts::{DESIGN_PROMPT, GRAPH_ANSWER_PROMPT, render_prompt};
use aeroplan_core::Result;
use aeroplan_core::config::LlmConfig;
use aeroplan_core::graph::GraphQueryResult;
use aeroplan_core::llm::{CompletionRequest, LlmClient, TokenStream};
use futures::{StreamExt, TryStreamExt, future};
use minijinja::context;
use std::sync::Arc;

/// Turns graph query results into a natural-language answer.
#[derive(Clone)]
pub struct GraphAnswerSynthesizer {
    llm: Arc<dyn LlmClient>,
    model: String,
    temperature: Option<f32>,
}

impl GraphAnswerSynthesizer {
    pub fn new(llm: Arc<dyn LlmClient>, model: impl Into<String>, temperature: Option<f32>) -> Self {
        Self {
            llm,
            model: model.into(),
            temperature,
        }
    }

    pub fn from_config(llm: Arc<dyn LlmClient>, config: &LlmConfig) -> Self {
        Self::new(llm, config.graph_answer_model.clone(), config.temperature)
    }

    pub async fn stream(&self, question: &str, result: &GraphQueryResult) -> Result<TokenStream> {
        let prompt = render_prompt(
            GRAPH_ANSWER_PROMPT,
            context! {
                question => question,
                cypher => &result.cypher,
                graph_data => result.records_json(),
            },
        )?;
        let request =
            CompletionRequest::new(self.model.clone(), prompt).with_temperature(self.temperature);
        Ok(non_empty(self.llm.stream(request).await?))
    }
}

/// Generates a four-phase assembly plan from the conversation history.
#[derive(Clone)]
pub struct DesignSynthesizer {
    llm: Arc<dyn LlmClient>,
    model: String,
    temperature: Option<f32>,
}

impl DesignSynthesizer {
    pub fn new(llm: Arc<dyn LlmClient>, model: impl Into<String>, temperature: Option<f32>) -> Self {
        Self {
            llm,
            model: model.into(),
            temperature,
        }
    }

    pub fn from_config(llm: Arc<dyn LlmClient>, config: &LlmConfig) -> Self {
        Self::new(llm, config.design_model.clone(), config.temperature)
    }

    pub async fn stream(&self, question: &str, history: &str) -> Result<TokenStream> {
        let prompt = render_prompt(
            DESIGN_PROMPT,
            context! { history => history, question => question },
        )?;
        let request =
            CompletionRequest::new(self.model.clone(), prompt).with_temperature(self.temperature);
        Ok(non_empty(self.llm.stream(request).await?))
    }
}

fn non_empty(tokens: TokenStream) -> TokenStream {
    tokens
        .try_filter(|token| future::ready(!token.is_empty()))
        .boxed()
}
