//! QueryRouter - Classifies each question into an `Intent` with one LLM call.

use crate::prompts::{ROUTER_PROMPT, render_prompt};
use aeroplan_core::config::LlmConfig;
use aeroplan_core::llm::{CompletionRequest, LlmClient};
use aeroplan_core::{Intent, Result, UnrecognizedIntentPolicy};
use minijinja::context;
use std::sync::Arc;

/// Routes questions to the graph or design pipeline.
#[derive(Clone)]
pub struct QueryRouter {
    llm: Arc<dyn LlmClient>,
    model: String,
    temperature: Option<f32>,
    policy: UnrecognizedIntentPolicy,
}

impl QueryRouter {
    pub fn new(llm: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
            temperature: None,
            policy: UnrecognizedIntentPolicy::default(),
        }
    }

    pub fn from_config(llm: Arc<dyn LlmClient>, config: &LlmConfig) -> Self {
        Self::new(llm, config.router_model.clone())
            .with_temperature(config.temperature)
            .with_policy(config.unrecognized_intent)
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_policy(mut self, policy: UnrecognizedIntentPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Classifies `question`. No retries: a failed call or an unrecognized
    /// answer (under the `Reject` policy) fails the turn.
    pub async fn classify(&self, question: &str) -> Result<Intent> {
        let prompt = render_prompt(ROUTER_PROMPT, context! { question => question })?;
        let request =
            CompletionRequest::new(self.model.clone(), prompt).with_temperature(self.temperature);
        let raw = self.llm.complete(request).await?;

        match Intent::parse(&raw) {
            Ok(intent) => {
                tracing::debug!("[Router] '{}' -> {}", question, intent);
                Ok(intent)
            }
            Err(err) if err.is_classification() => match self.policy {
                UnrecognizedIntentPolicy::Reject => Err(err),
                UnrecognizedIntentPolicy::FallbackToGraph => {
                    tracing::warn!(
                        "[Router] Unrecognized classification '{}', falling back to graph",
                        raw.trim()
                    );
                    Ok(Intent::GraphRetrieval)
                }
            },
            Err(err) => Err(err),
        }
    }
}
