/// LLM Client — the single point of entry for upstream AI calls.
///
/// ARCHITECTURAL RULE: No other module may call the Anthropic API directly.
/// Callers go through a [`CompletionBackend`] and wrap it in [`retry::retry`];
/// the backend itself makes exactly one attempt per call.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod prompts;
pub mod retry;

use retry::{Classify, ErrorClass, RetryError, RetryPolicy};

pub const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// Used when the caller does not name a model.
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 4096;

/// Body fragments that mark a transient upstream condition.
const TRANSIENT_MARKERS: &[&str] = &[
    "overload",
    "quota",
    "rate limit",
    "rate_limit",
    "timeout",
    "timed out",
    "try again",
    "temporarily unavailable",
];

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("LLM client is not configured: {0}")]
    Config(String),
}

impl Classify for LlmError {
    fn classify(&self) -> ErrorClass {
        match self {
            LlmError::Http(_) | LlmError::Parse(_) | LlmError::EmptyContent => ErrorClass::Retryable,
            LlmError::Api { status, message } => {
                let lower = message.to_lowercase();
                if matches!(status, 429 | 503 | 504 | 529)
                    || TRANSIENT_MARKERS.iter().any(|marker| lower.contains(marker))
                {
                    ErrorClass::Retryable
                } else {
                    ErrorClass::Fatal
                }
            }
            LlmError::Config(_) => ErrorClass::Fatal,
        }
    }
}

/// One upstream request. Replayed verbatim on every attempt.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub system: String,
    pub prompt: String,
}

/// Anything that can answer a [`CompletionRequest`] with model text.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// A single attempt; retries belong to the caller.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// Anthropic Messages API backend.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: Option<String>,
    api_url: String,
}

impl LlmClient {
    pub fn new(
        api_key: Option<String>,
        api_url: String,
        attempt_timeout: Duration,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(attempt_timeout).build()?,
            api_key,
            api_url,
        })
    }
}

#[async_trait]
impl CompletionBackend for LlmClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| LlmError::Config("ANTHROPIC_API_KEY is not set".to_string()))?;

        let request_body = AnthropicRequest {
            model: &request.model,
            max_tokens: MAX_TOKENS,
            system: &request.system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: &request.prompt,
            }],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Prefer the API's own message; fall back to the raw body.
            let message = serde_json::from_str::<AnthropicError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let llm_response: LlmResponse = serde_json::from_str(&body)?;

        debug!(
            model = %request.model,
            input_tokens = llm_response.usage.input_tokens,
            output_tokens = llm_response.usage.output_tokens,
            "LLM call succeeded"
        );

        llm_response
            .text()
            .map(str::to_string)
            .filter(|text| !text.trim().is_empty())
            .ok_or(LlmError::EmptyContent)
    }
}

/// Calls the backend under the retry policy and deserializes the reply as JSON.
/// An unparsable reply counts as a retryable failure.
pub async fn complete_json<T: DeserializeOwned>(
    backend: &dyn CompletionBackend,
    policy: &RetryPolicy,
    request: &CompletionRequest,
) -> Result<T, RetryError<LlmError>> {
    retry::retry(policy, |_attempt| async move {
        let text = backend.complete(request).await?;
        // Strip markdown code fences if the model wraps JSON in them
        serde_json::from_str(strip_json_fences(&text)).map_err(LlmError::Parse)
    })
    .await
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
