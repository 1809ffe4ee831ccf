//! Text-generation backends.
//!
//! Every backend takes the same [`GenerationRequest`] and returns plain text.
//! Exactly one HTTP call is made per request; nothing is retried.

mod anthropic;
mod gemini;
mod openai;

pub use anthropic::AnthropicProvider;
pub use gemini::GeminiProvider;
pub use openai::OpenAIProvider;

use crate::error::ProviderError;
use crate::log_debug;
use crate::providers::Provider;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use std::time::Duration;

/// Prompt plus sampling parameters for one remote call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system_prompt: String,
    pub prompt: String,
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// Connection settings shared by every backend
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub api_key: String,
    /// Scheme and host, without a trailing slash
    pub base_url: String,
    pub timeout: Duration,
}

/// A remote text-generation service
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Short backend label used in errors and logs
    fn name(&self) -> &'static str;

    /// Sends `request` and returns the generated text
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError>;
}

/// Builds the backend selected by `provider`
pub fn create_provider(
    provider: Provider,
    settings: ProviderSettings,
) -> Result<Box<dyn LLMProvider>, ProviderError> {
    let client = Client::builder()
        .timeout(settings.timeout)
        .build()
        .map_err(|source| ProviderError::Transport {
            provider: provider.label(),
            source,
        })?;

    log_debug!(
        "Creating {} provider against {}",
        provider.label(),
        settings.base_url
    );

    Ok(match provider {
        Provider::OpenAI => Box::new(OpenAIProvider::new(settings, client)),
        Provider::Anthropic => Box::new(AnthropicProvider::new(settings, client)),
        Provider::Gemini => Box::new(GeminiProvider::new(settings, client)),
    })
}

/// Sends a prepared request and returns the parsed JSON body.
///
/// Non-success statuses become [`ProviderError::Authentication`] or
/// [`ProviderError::Api`]; an unparseable body is a malformed response.
pub(crate) async fn send_json(
    provider: &'static str,
    request: RequestBuilder,
) -> Result<serde_json::Value, ProviderError> {
    let response = request
        .send()
        .await
        .map_err(|source| ProviderError::Transport { provider, source })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        log_debug!("{} API request failed with status {}: {}", provider, status, body);
        return Err(ProviderError::from_status(provider, status, body));
    }

    let body = response
        .text()
        .await
        .map_err(|source| ProviderError::Transport { provider, source })?;

    serde_json::from_str(&body).map_err(|e| ProviderError::MalformedResponse {
        provider,
        detail: format!("invalid JSON body: {e}"),
    })
}

/// Pulls a non-empty string out of `value`, trimming whitespace
pub(crate) fn extract_text(
    provider: &'static str,
    value: &serde_json::Value,
    what: &str,
) -> Result<String, ProviderError> {
    value
        .as_str()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(ToString::to_string)
        .ok_or_else(|| ProviderError::MalformedResponse {
            provider,
            detail: format!("missing {what}"),
        })
}
