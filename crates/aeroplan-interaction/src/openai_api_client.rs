//! OpenAiApiClient - Direct REST client for OpenAI-compatible Chat Completions.
//!
//! Supports both one-shot completions (used by the router and Cypher
//! generation) and server-sent-event streaming (used by the answer
//! synthesizers).

use crate::sse::{SseDecoder, SseEvent};
use aeroplan_core::config::LlmConfig;
use aeroplan_core::llm::{CompletionRequest, LlmClient, TokenStream};
use aeroplan_core::{AeroError, Result};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::env;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Client for the `/chat/completions` endpoint.
#[derive(Clone, Debug)]
pub struct OpenAiApiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiApiClient {
    /// Creates a client for the public OpenAI endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Builds a client from the `[llm]` configuration section.
    ///
    /// The API key must be present, either in the file or through
    /// `OPENAI_API_KEY` (merged in by the config service).
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                AeroError::config("OPENAI_API_KEY not found in config file or environment variables")
            })?;
        Ok(Self::new(api_key).with_base_url(&config.base_url))
    }

    /// Loads the key from `OPENAI_API_KEY` and the endpoint from `OPENAI_BASE_URL`.
    pub fn try_from_env() -> Result<Self> {
        let api_key = env::var("OPENAI_API_KEY")
            .map_err(|_| AeroError::config("OPENAI_API_KEY not found in environment variables"))?;
        let base_url = env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        Ok(Self::new(api_key).with_base_url(base_url))
    }

    /// Overrides the API root (for proxies and compatible servers).
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> Self {
        self.base_url = base_url.as_ref().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    async fn send_request(&self, body: &ChatCompletionRequest) -> Result<Response> {
        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|err| AeroError::generation(format!("OpenAI API request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read OpenAI error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        Ok(response)
    }
}

#[async_trait]
impl LlmClient for OpenAiApiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let body = ChatCompletionRequest::from_request(request, false);
        tracing::debug!("[OpenAiApiClient] Completion with model {}", body.model);

        let parsed: ChatCompletionResponse = self
            .send_request(&body)
            .await?
            .json()
            .await
            .map_err(|err| AeroError::generation(format!("Failed to parse OpenAI response: {err}")))?;

        extract_text_response(parsed)
    }

    async fn stream(&self, request: CompletionRequest) -> Result<TokenStream> {
        let body = ChatCompletionRequest::from_request(request, true);
        tracing::debug!("[OpenAiApiClient] Streaming completion with model {}", body.model);

        let response = self.send_request(&body).await?;
        let bytes = response
            .bytes_stream()
            .map(|chunk| chunk.map(|b| b.to_vec()))
            .boxed();

        Ok(token_stream(bytes))
    }
}

struct StreamState {
    bytes: BoxStream<'static, reqwest::Result<Vec<u8>>>,
    decoder: SseDecoder,
    pending: VecDeque<Result<String>>,
    finished: bool,
}

/// Turns raw SSE bytes into content fragments, pulling from the network
/// only when the consumer asks for the next fragment.
fn token_stream(bytes: BoxStream<'static, reqwest::Result<Vec<u8>>>) -> TokenStream {
    let state = StreamState {
        bytes,
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                return Some((item, state));
            }
            if state.finished {
                return None;
            }

            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    let events = state.decoder.push(&chunk);
                    state.enqueue(events);
                }
                Some(Err(err)) => {
                    state.finished = true;
                    state.pending.push_back(Err(AeroError::generation(format!(
                        "OpenAI stream interrupted: {err}"
                    ))));
                }
                None => {
                    let tail = state.decoder.finish();
                    state.enqueue(tail);
                    state.finished = true;
                }
            }
        }
    })
    .boxed()
}

impl StreamState {
    fn enqueue(&mut self, events: impl IntoIterator<Item = SseEvent>) {
        for event in events {
            if self.finished {
                return;
            }
            match event {
                SseEvent::Done => self.finished = true,
                SseEvent::Data(data) => match parse_stream_chunk(&data) {
                    Ok(Some(token)) => self.pending.push_back(Ok(token)),
                    Ok(None) => {}
                    Err(err) => {
                        self.pending.push_back(Err(err));
                        self.finished = true;
                    }
                },
            }
        }
    }
}

/// Content delta of one streamed chunk; `None` for role-only or empty deltas.
fn parse_stream_chunk(data: &str) -> Result<Option<String>> {
    let chunk: ChatCompletionChunk = serde_json::from_str(data)
        .map_err(|err| AeroError::generation(format!("Malformed OpenAI stream chunk: {err}")))?;

    if let Some(error) = chunk.error {
        return Err(AeroError::generation(format!(
            "OpenAI stream error: {}",
            error.message
        )));
    }

    Ok(chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .filter(|content| !content.is_empty()))
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

impl ChatCompletionRequest {
    fn from_request(request: CompletionRequest, stream: bool) -> Self {
        Self {
            model: request.model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: request.prompt,
            }],
            temperature: request.temperature,
            stream,
        }
    }
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatCompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
    error: Option<ErrorBody>,
}

#[derive(Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: Delta,
}

#[derive(Deserialize, Default)]
struct Delta {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn extract_text_response(response: ChatCompletionResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| AeroError::generation("OpenAI API returned no content in the response"))
}

fn map_http_error(status: StatusCode, body: String) -> AeroError {
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or(body);

    let is_retryable = matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    );

    AeroError::generation(format!(
        "OpenAI API returned {}{}: {}",
        status.as_u16(),
        if is_retryable { " (retryable)" } else { "" },
        message
    ))
}
