use anyhow::{Context, Result};
use std::time::Duration;

use super::types::GeneratedMessage;
use crate::compressor::{CompressedReport, compress};
use crate::config::Config;
use crate::context::{ChangeSet, ReviewLevel};
use crate::error::ProviderError;
use crate::llm_providers::{GenerationRequest, LLMProvider, ProviderSettings, create_provider};
use crate::log_debug;
use crate::prompt::{Task, build_prompt};

/// Outcome of a review request
#[derive(Debug, Clone)]
pub struct ReviewResult {
    pub review: String,
    pub level: ReviewLevel,
    pub report: CompressedReport,
}

impl ReviewResult {
    /// Rough token cost of the compressed input
    pub fn token_estimate(&self) -> usize {
        self.report.token_estimate()
    }
}

/// Compresses changes, builds prompts and talks to one text-generation backend
pub struct AutoCommitService {
    config: Config,
    model: String,
    provider: Box<dyn LLMProvider>,
}

impl AutoCommitService {
    /// Create a service around an already-built provider
    pub fn new(config: Config, provider: Box<dyn LLMProvider>) -> Result<Self> {
        let model = config.effective_model()?;
        Ok(Self {
            config,
            model,
            provider,
        })
    }

    /// Validate `config`, resolve the credential and build the configured backend
    pub fn from_config(config: Config) -> Result<Self> {
        config.validate()?;
        let provider = config.provider()?;
        let settings = ProviderSettings {
            api_key: config.api_key()?,
            base_url: config.effective_base_url()?,
            timeout: Duration::from_secs(config.ai.timeout_seconds),
        };
        let backend = create_provider(provider, settings)
            .with_context(|| format!("Failed to set up the {} client", provider.label()))?;
        Self::new(config, backend)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Ask for a review of `changes` at `level`
    pub async fn review(
        &self,
        changes: &ChangeSet,
        level: ReviewLevel,
    ) -> Result<ReviewResult, ProviderError> {
        let report = compress(&changes.all_files(), level);
        log_debug!(
            "Review report: {} mode, ~{} tokens",
            report.mode(),
            report.token_estimate()
        );

        let request = GenerationRequest {
            system_prompt: Task::Review.system_prompt().to_string(),
            prompt: build_prompt(&report, level, Task::Review, &self.config),
            model: self.model.clone(),
            temperature: self.config.review.temperature,
            max_output_tokens: self.config.review_max_tokens(level),
        };

        let review = self.provider.generate(&request).await?;
        Ok(ReviewResult {
            review,
            level,
            report,
        })
    }

    /// Ask for a commit message describing `changes`
    pub async fn generate_commit_message(
        &self,
        changes: &ChangeSet,
    ) -> Result<GeneratedMessage, ProviderError> {
        let level = self.config.commit.level;
        let report = compress(&changes.all_files(), level);
        log_debug!(
            "Commit report: {} mode, ~{} tokens",
            report.mode(),
            report.token_estimate()
        );

        let request = GenerationRequest {
            system_prompt: Task::CommitMessage.system_prompt().to_string(),
            prompt: build_prompt(&report, level, Task::CommitMessage, &self.config),
            model: self.model.clone(),
            temperature: self.config.ai.temperature,
            max_output_tokens: self.config.ai.max_tokens,
        };

        let raw = self.provider.generate(&request).await?;
        let message = GeneratedMessage::parse(&raw);
        if message.is_empty() {
            return Err(ProviderError::MalformedResponse {
                provider: self.provider.name(),
                detail: "empty commit message".to_string(),
            });
        }
        Ok(message)
    }
}
