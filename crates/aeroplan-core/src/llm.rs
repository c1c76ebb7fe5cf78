//! LLM service boundary.

use crate::error::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

/// Incremental text fragments in generation order.
///
/// The stream is lazy and single-pass; dropping it cancels the generation
/// on the client side.
pub type TokenStream = BoxStream<'static, Result<String>>;

/// A single-prompt completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Prompt text in, text or token stream out.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Returns the whole completion at once.
    async fn complete(&self, request: CompletionRequest) -> Result<String>;

    /// Starts a streaming completion.
    ///
    /// Errors establishing the stream are returned directly; errors during
    /// streaming are yielded as stream items.
    async fn stream(&self, request: CompletionRequest) -> Result<TokenStream>;
}
