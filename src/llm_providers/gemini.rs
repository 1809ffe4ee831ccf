use super::{GenerationRequest, LLMProvider, ProviderSettings, extract_text, send_json};
use crate::error::ProviderError;
use crate::trace_debug;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

const NAME: &str = "Gemini";

/// Represents the Gemini LLM provider
pub struct GeminiProvider {
    settings: ProviderSettings,
    client: Client,
}

impl GeminiProvider {
    /// Creates a new instance of `GeminiProvider` with the given settings
    pub fn new(settings: ProviderSettings, client: Client) -> Self {
        Self { settings, client }
    }
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    /// Generates text using the `generateContent` endpoint
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        let body = json!({
            "systemInstruction": {
                "parts": [{"text": request.system_prompt}]
            },
            "contents": [
                {
                    "role": "user",
                    "parts": [{"text": request.prompt}]
                }
            ],
            "generationConfig": {
                // Model is specified in the URL, not here
                "temperature": request.temperature,
                "maxOutputTokens": request.max_output_tokens
            }
        });

        trace_debug!(model = %request.model, "sending generateContent request");
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.settings.base_url, request.model
        );
        let response = send_json(
            NAME,
            self.client
                .post(url)
                .header("x-goog-api-key", &self.settings.api_key)
                .json(&body),
        )
        .await?;

        // {"candidates": [{"content": {"parts": [{"text": "..."}]}}]}
        extract_text(
            NAME,
            &response["candidates"][0]["content"]["parts"][0]["text"],
            "candidates[0].content.parts[0].text",
        )
    }
}
