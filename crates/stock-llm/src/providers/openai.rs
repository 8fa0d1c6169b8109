//! OpenAI-compatible chat provider
//!
//! Talks to any endpoint implementing `POST {api_base}/chat/completions`.
//! The defaults point at Groq's OpenAI-compatible API.
//!
//! # Example
//!
//! ```no_run
//! use stock_llm::providers::{OpenAIConfig, OpenAIProvider};
//! use stock_llm::{ChatMessage, ChatProvider, ChatRequest};
//!
//! # async fn example() -> stock_llm::Result<()> {
//! let config = OpenAIConfig::from_env()?;
//! let model = config.model.clone();
//! let provider = OpenAIProvider::with_config(config)?;
//!
//! let reply = provider
//!     .complete(ChatRequest::new(model).message(ChatMessage::user("Hello!")))
//!     .await?;
//! println!("{reply}");
//! # Ok(())
//! # }
//! ```

use crate::{ChatMessage, ChatProvider, ChatRequest, LLMError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use stock_utils::EnvSource;
use tracing::{debug, instrument};

/// Primary API key variable
pub const API_KEY_ENV: &str = "GROQ_API_KEY";
/// API key variable used when `GROQ_API_KEY` is unset
pub const FALLBACK_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const API_BASE_ENV: &str = "LLM_API_BASE";
pub const MODEL_ENV: &str = "LLM_MODEL";

pub const DEFAULT_API_BASE: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Configuration for the OpenAI-compatible provider
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// API key for authentication
    pub api_key: String,

    /// Base URL, without the `/chat/completions` suffix
    pub api_base: String,

    /// Model used by callers that do not pick one
    pub model: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl OpenAIConfig {
    /// Create a config with the given API key and default settings
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Create config from the process environment
    ///
    /// Reads the key from `GROQ_API_KEY`, falling back to `OPENAI_API_KEY`;
    /// `LLM_API_BASE` and `LLM_MODEL` override the defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_source(&EnvSource::Process)
    }

    pub fn from_source(env: &EnvSource) -> Result<Self> {
        let api_key = env
            .get(API_KEY_ENV)
            .or_else(|| env.get(FALLBACK_API_KEY_ENV))
            .ok_or_else(|| {
                LLMError::ConfigurationError(format!(
                    "{API_KEY_ENV} (or {FALLBACK_API_KEY_ENV}) environment variable not set"
                ))
            })?;

        Ok(Self::new(api_key)
            .with_api_base(env.get_or(API_BASE_ENV, DEFAULT_API_BASE))
            .with_model(env.get_or(MODEL_ENV, DEFAULT_MODEL)))
    }

    /// Set custom API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set request timeout in seconds
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// OpenAI-compatible chat provider
pub struct OpenAIProvider {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIProvider {
    pub fn with_config(config: OpenAIConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Create a provider from environment variables
    pub fn from_env() -> Result<Self> {
        Self::with_config(OpenAIConfig::from_env()?)
    }

    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }
}

#[async_trait]
impl ChatProvider for OpenAIProvider {
    #[instrument(skip(self, request), fields(model = %request.model, api_base = %self.config.api_base))]
    async fn complete(&self, request: ChatRequest) -> Result<String> {
        debug!("Sending chat request to {}", self.config.api_base);

        let body = OpenAIRequest {
            model: &request.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.api_base))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await?;
            return Err(status_error(status, error_text, request.model));
        }

        let response: OpenAIResponse = response.json().await.map_err(|e| {
            LLMError::UnexpectedResponse(format!("Failed to parse response: {e}"))
        })?;

        first_choice_text(response)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

#[derive(Debug, Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
    #[serde(default)]
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

fn status_error(status: u16, error_text: String, model: String) -> LLMError {
    match status {
        401 => LLMError::AuthenticationFailed,
        429 => LLMError::RateLimitExceeded(error_text),
        400 => LLMError::InvalidRequest(error_text),
        404 => LLMError::ModelNotFound(model),
        _ => LLMError::RequestFailed(format!("HTTP {status}: {error_text}")),
    }
}

fn first_choice_text(response: OpenAIResponse) -> Result<String> {
    if let Some(usage) = &response.usage {
        debug!(
            "Received response - tokens: {}/{}",
            usage.prompt_tokens, usage.completion_tokens
        );
    }

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LLMError::UnexpectedResponse("No choices in response".to_string()))?;

    debug!("Finish reason: {:?}", choice.finish_reason);

    choice
        .message
        .content
        .ok_or_else(|| LLMError::UnexpectedResponse("Empty message content".to_string()))
}
