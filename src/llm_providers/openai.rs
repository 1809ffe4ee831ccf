use super::{GenerationRequest, LLMProvider, ProviderSettings, extract_text, send_json};
use crate::error::ProviderError;
use crate::trace_debug;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

const NAME: &str = "OpenAI";

/// OpenAI-compatible chat completions backend
pub struct OpenAIProvider {
    settings: ProviderSettings,
    client: Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl OpenAIProvider {
    pub fn new(settings: ProviderSettings, client: Client) -> Self {
        Self { settings, client }
    }
}

/// Reasoning models reject `temperature` and use `max_completion_tokens`
pub fn is_reasoning_model(model: &str) -> bool {
    let lower = model.to_lowercase();
    lower.starts_with('o') || lower.starts_with("gpt-5")
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        let reasoning = is_reasoning_model(&request.model);
        let body = ChatRequest {
            model: &request.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            temperature: (!reasoning).then_some(request.temperature),
            max_tokens: (!reasoning).then_some(request.max_output_tokens),
            max_completion_tokens: reasoning.then_some(request.max_output_tokens),
        };

        trace_debug!(model = %request.model, reasoning, "sending chat completion");
        let url = format!("{}/v1/chat/completions", self.settings.base_url);
        let response = send_json(
            NAME,
            self.client
                .post(url)
                .bearer_auth(&self.settings.api_key)
                .json(&body),
        )
        .await?;

        extract_text(
            NAME,
            &response["choices"][0]["message"]["content"],
            "choices[0].message.content",
        )
    }
}
