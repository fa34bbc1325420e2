//! Chat-completion client for poem search and analysis.
//!
//! [`CompletionClient`] is the seam the core crate talks to. The production
//! implementation is [`OpenRouterClient`], which speaks the OpenAI-compatible
//! `chat/completions` protocol. Model replies are free text; [`extract_json`]
//! pulls the structured payload out of them.

mod json;
mod openrouter;

use poetryhub_shared::Result;

pub use json::extract_json;
pub use openrouter::OpenRouterClient;

/// A single-turn completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// System prompt describing the expected reply.
    pub system: String,
    /// User message.
    pub user: String,
    /// Sampling temperature.
    pub temperature: f32,
}

/// The model's reply plus usage accounting.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub model: String,
    pub tokens_in: u64,
    pub tokens_out: u64,
}

/// Something that can answer a [`CompletionRequest`].
#[allow(async_fn_in_trait)]
pub trait CompletionClient {
    /// Model identifier, used as part of cache keys.
    fn model(&self) -> &str;

    /// Run one completion.
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion>;
}
