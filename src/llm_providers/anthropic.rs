use super::{GenerationRequest, LLMProvider, ProviderSettings, extract_text, send_json};
use crate::error::ProviderError;
use crate::trace_debug;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

const NAME: &str = "Anthropic";
const API_VERSION: &str = "2023-06-01";

/// Anthropic Messages API backend
pub struct AnthropicProvider {
    settings: ProviderSettings,
    client: Client,
}

impl AnthropicProvider {
    pub fn new(settings: ProviderSettings, client: Client) -> Self {
        Self { settings, client }
    }
}

#[async_trait]
impl LLMProvider for AnthropicProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        let body = json!({
            "model": request.model,
            "system": request.system_prompt,
            "max_tokens": request.max_output_tokens,
            "temperature": request.temperature,
            "messages": [
                {"role": "user", "content": request.prompt}
            ]
        });

        trace_debug!(model = %request.model, "sending messages request");
        let url = format!("{}/v1/messages", self.settings.base_url);
        let response = send_json(
            NAME,
            self.client
                .post(url)
                .header("x-api-key", &self.settings.api_key)
                .header("anthropic-version", API_VERSION)
                .json(&body),
        )
        .await?;

        // The first content block holds the text; tool and thinking blocks never appear here
        extract_text(NAME, &response["content"][0]["text"], "content[0].text")
    }
}
