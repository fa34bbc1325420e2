//! OpenRouter (OpenAI-compatible) completion client.

use std::time::Duration;

use poetryhub_shared::{AiConfig, PoetryHubError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use crate::{Completion, CompletionClient, CompletionRequest};

/// User-Agent string for completion requests.
const USER_AGENT: &str = concat!("PoetryHub/", env!("CARGO_PKG_VERSION"));

/// Longest error body echoed back in an error message.
const MAX_ERROR_BODY: usize = 500;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Completion client for OpenRouter or any OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct OpenRouterClient {
    http: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl OpenRouterClient {
    /// Build a client from the `[ai]` config section and a resolved API key.
    pub fn new(config: &AiConfig, api_key: impl Into<String>) -> Result<Self> {
        let base = Url::parse(&config.base_url).map_err(|e| {
            PoetryHubError::config(format!("invalid ai.base_url '{}': {e}", config.base_url))
        })?;

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PoetryHubError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", base.as_str().trim_end_matches('/')),
            api_key: api_key.into(),
            model: config.default_model.clone(),
        })
    }

    /// Use a different model than the configured default.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

impl CompletionClient for OpenRouterClient {
    fn model(&self) -> &str {
        &self.model
    }

    #[instrument(skip_all, fields(model = %self.model))]
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: request.temperature,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| PoetryHubError::Network(format!("{}: {e}", self.endpoint)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let text: String = text.chars().take(MAX_ERROR_BODY).collect();
            return Err(PoetryHubError::Ai(format!("API returned HTTP {status}: {text}")));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| PoetryHubError::Ai(format!("invalid completion response: {e}")))?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| PoetryHubError::Ai("completion returned no choices".into()))?;

        let usage = parsed.usage.unwrap_or_default();
        debug!(
            tokens_in = usage.prompt_tokens,
            tokens_out = usage.completion_tokens,
            "completion received"
        );

        Ok(Completion {
            text,
            model: parsed.model.unwrap_or_else(|| self.model.clone()),
            tokens_in: usage.prompt_tokens,
            tokens_out: usage.completion_tokens,
        })
    }
}
