use crate::context::ReviewLevel;
use crate::error::ConfigurationError;
use crate::providers::Provider;
use crate::{log_debug, log_warn};

use dirs::{config_dir, home_dir};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

/// Project configuration filename, looked up in the repository root
pub const PROJECT_CONFIG_FILENAME: &str = ".autocommit.toml";

/// Configuration assembled once at startup and passed to each component
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Backend name: openai, anthropic or gemini
    pub provider: String,
    /// Language the model should answer in
    pub language: String,
    pub ai: AiConfig,
    pub commit: CommitConfig,
    pub git: GitConfig,
    pub review: ReviewConfig,
}

/// Sampling parameters for commit message generation
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AiConfig {
    /// Model name; empty means the provider default
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Transport timeout for the single remote call
    pub timeout_seconds: u64,
    /// Endpoint override; empty means the provider's public API
    pub base_url: String,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct CommitConfig {
    pub conventional_commits: bool,
    pub max_subject_length: usize,
    pub types: Vec<String>,
    /// Compression level applied to the diff before asking for a message
    pub level: ReviewLevel,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct GitConfig {
    pub auto_add: bool,
    /// Gitignore-style patterns dropped from every change read
    pub exclude_patterns: Vec<String>,
    /// Run pre-commit and post-commit hooks
    pub verify: bool,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ReviewConfig {
    pub enabled: bool,
    pub default_level: ReviewLevel,
    pub temperature: f32,
    pub max_tokens_quick: u32,
    pub max_tokens_normal: u32,
    pub max_tokens_detailed: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: Provider::default().name().to_string(),
            language: "English".to_string(),
            ai: AiConfig::default(),
            commit: CommitConfig::default(),
            git: GitConfig::default(),
            review: ReviewConfig::default(),
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            model: String::new(),
            temperature: 0.3,
            max_tokens: 500,
            timeout_seconds: 60,
            base_url: String::new(),
        }
    }
}

impl Default for CommitConfig {
    fn default() -> Self {
        Self {
            conventional_commits: true,
            max_subject_length: 72,
            types: [
                "feat", "fix", "docs", "style", "refactor", "test", "chore", "perf", "ci", "build",
            ]
            .iter()
            .map(ToString::to_string)
            .collect(),
            level: ReviewLevel::Normal,
        }
    }
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            auto_add: false,
            exclude_patterns: ["*.log", "*.tmp", ".env", "__pycache__/"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            verify: true,
        }
    }
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            default_level: ReviewLevel::Quick,
            temperature: 0.2,
            max_tokens_quick: 150,
            max_tokens_normal: 400,
            max_tokens_detailed: 800,
        }
    }
}

impl Config {
    /// Load the layered configuration.
    ///
    /// An explicit path replaces the personal and project files. Environment
    /// overrides are applied last.
    pub fn load(explicit: Option<&Path>, repo_root: Option<&Path>) -> Result<Self, ConfigurationError> {
        let paths = match explicit {
            Some(path) => vec![path.to_path_buf()],
            None => {
                let mut paths = Vec::new();
                if let Some(personal) = Self::personal_config_path()
                    && personal.exists()
                {
                    paths.push(personal);
                }
                if let Some(root) = repo_root {
                    let project = root.join(PROJECT_CONFIG_FILENAME);
                    if project.exists() {
                        paths.push(project);
                    }
                }
                paths
            }
        };

        let mut config = Self::from_files(&paths)?;
        config.apply_env_overrides_with(|key| env::var(key).ok());
        log_debug!("Configuration loaded from {:?}: {:?}", paths, config);
        Ok(config)
    }

    /// Merge the given TOML files in order over the defaults
    pub fn from_files(paths: &[PathBuf]) -> Result<Self, ConfigurationError> {
        let mut merged = toml::Value::Table(toml::map::Map::new());

        for path in paths {
            let content = fs::read_to_string(path).map_err(|source| ConfigurationError::Read {
                path: path.clone(),
                source,
            })?;
            let layer: toml::Value =
                toml::from_str(&content).map_err(|source| ConfigurationError::Parse {
                    path: path.clone(),
                    source,
                })?;
            log_debug!("Merging config layer {}", path.display());
            merge_values(&mut merged, layer);
        }

        merged.try_into().map_err(ConfigurationError::Deserialize)
    }

    /// Apply `AI_*` overrides read through `lookup`.
    ///
    /// Values that fail to parse are ignored with a warning.
    pub fn apply_env_overrides_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(provider) = lookup("AI_PROVIDER").filter(|v| !v.trim().is_empty()) {
            self.provider = provider.trim().to_string();
        }
        if let Some(model) = lookup("AI_MODEL").filter(|v| !v.trim().is_empty()) {
            self.ai.model = model.trim().to_string();
        }
        if let Some(base_url) = lookup("AI_BASE_URL").filter(|v| !v.trim().is_empty()) {
            self.ai.base_url = base_url.trim().to_string();
        }
        if let Some(raw) = lookup("AI_TEMPERATURE") {
            match raw.trim().parse::<f32>() {
                Ok(temperature) => self.ai.temperature = temperature,
                Err(e) => log_warn!("Ignoring AI_TEMPERATURE={raw:?}: {e}"),
            }
        }
        if let Some(raw) = lookup("AI_MAX_TOKENS") {
            match raw.trim().parse::<u32>() {
                Ok(max_tokens) => self.ai.max_tokens = max_tokens,
                Err(e) => log_warn!("Ignoring AI_MAX_TOKENS={raw:?}: {e}"),
            }
        }
    }

    /// The configured backend
    pub fn provider(&self) -> Result<Provider, ConfigurationError> {
        self.provider.parse()
    }

    /// Configured model, or the provider default when unset
    pub fn effective_model(&self) -> Result<String, ConfigurationError> {
        let provider = self.provider()?;
        Ok(if self.ai.model.is_empty() {
            provider.default_model().to_string()
        } else {
            self.ai.model.clone()
        })
    }

    /// Endpoint to send requests to
    pub fn effective_base_url(&self) -> Result<String, ConfigurationError> {
        let provider = self.provider()?;
        Ok(if self.ai.base_url.is_empty() {
            provider.default_base_url().to_string()
        } else {
            self.ai.base_url.trim_end_matches('/').to_string()
        })
    }

    /// Output cap requested for a review at `level`
    pub const fn review_max_tokens(&self, level: ReviewLevel) -> u32 {
        match level {
            ReviewLevel::Quick => self.review.max_tokens_quick,
            ReviewLevel::Normal => self.review.max_tokens_normal,
            ReviewLevel::Detailed => self.review.max_tokens_detailed,
        }
    }

    /// Resolve the provider credential through `lookup`
    pub fn api_key_with<F>(&self, lookup: F) -> Result<String, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let provider = self.provider()?;
        lookup(provider.api_key_env())
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ConfigurationError::MissingApiKey {
                provider: provider.label().to_string(),
                env_var: provider.api_key_env(),
            })
    }

    /// Resolve the provider credential from the process environment
    pub fn api_key(&self) -> Result<String, ConfigurationError> {
        self.api_key_with(|key| env::var(key).ok())
    }

    /// Check ranges and credentials before any remote call is made
    pub fn validate_with<F>(&self, lookup: F) -> Result<(), ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.provider()?;

        check_temperature("ai.temperature", self.ai.temperature)?;
        check_temperature("review.temperature", self.review.temperature)?;

        check_positive("ai.max_tokens", u64::from(self.ai.max_tokens))?;
        check_positive("ai.timeout_seconds", self.ai.timeout_seconds)?;
        check_positive("review.max_tokens_quick", u64::from(self.review.max_tokens_quick))?;
        check_positive("review.max_tokens_normal", u64::from(self.review.max_tokens_normal))?;
        check_positive(
            "review.max_tokens_detailed",
            u64::from(self.review.max_tokens_detailed),
        )?;
        if self.commit.max_subject_length == 0 {
            return Err(ConfigurationError::InvalidValue {
                key: "commit.max_subject_length",
                reason: "must be greater than 0".to_string(),
            });
        }

        if !self.ai.base_url.is_empty() {
            Url::parse(&self.ai.base_url).map_err(|e| ConfigurationError::InvalidValue {
                key: "ai.base_url",
                reason: e.to_string(),
            })?;
        }

        self.api_key_with(lookup)?;
        Ok(())
    }

    /// Validate against the process environment
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.validate_with(|key| env::var(key).ok())
    }

    /// Path of the personal configuration file
    pub fn personal_config_path() -> Option<PathBuf> {
        config_dir().map(|dir| dir.join("auto-commit").join("config.toml"))
    }
}

/// Load `.env` from the working directory, then from `~/.auto-commit/.env`.
///
/// Variables already present in the environment are never replaced.
pub fn load_dotenv() {
    if let Ok(path) = dotenv::dotenv() {
        log_debug!("Loaded environment from {}", path.display());
    }
    if let Some(home) = home_dir() {
        let path = home.join(".auto-commit").join(".env");
        if path.exists() && dotenv::from_path(&path).is_ok() {
            log_debug!("Loaded environment from {}", path.display());
        }
    }
}

/// Recursively merge `layer` into `base`; tables merge key by key, everything else replaces
fn merge_values(base: &mut toml::Value, layer: toml::Value) {
    match (base, layer) {
        (toml::Value::Table(base_table), toml::Value::Table(layer_table)) => {
            for (key, value) in layer_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (base, layer) => *base = layer,
    }
}

fn check_temperature(key: &'static str, value: f32) -> Result<(), ConfigurationError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidValue {
            key,
            reason: format!("{value} is outside 0.0..=1.0"),
        })
    }
}

fn check_positive(key: &'static str, value: u64) -> Result<(), ConfigurationError> {
    if value > 0 {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidValue {
            key,
            reason: "must be greater than 0".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_values_is_recursive() {
        let mut base: toml::Value = toml::from_str("[ai]\nmodel = \"a\"\ntemperature = 0.5\n")
            .expect("valid toml");
        let layer: toml::Value = toml::from_str("[ai]\nmodel = \"b\"\n").expect("valid toml");
        merge_values(&mut base, layer);

        assert_eq!(base["ai"]["model"].as_str(), Some("b"));
        assert_eq!(base["ai"]["temperature"].as_float(), Some(0.5));
    }

    #[test]
    fn test_review_max_tokens_per_level() {
        let config = Config::default();
        assert_eq!(config.review_max_tokens(ReviewLevel::Quick), 150);
        assert_eq!(config.review_max_tokens(ReviewLevel::Normal), 400);
        assert_eq!(config.review_max_tokens(ReviewLevel::Detailed), 800);
    }
}
