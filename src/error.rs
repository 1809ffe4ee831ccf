//! Error types for auto-commit components using thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from reading or writing the working tree.
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Not a Git repository: {}", path.display())]
    NotARepository {
        path: PathBuf,
        #[source]
        source: git2::Error,
    },

    #[error("Repository at {} has no working directory", path.display())]
    BareRepository { path: PathBuf },

    #[error("Failed to read {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Hook '{hook}' failed with exit code {code:?}")]
    HookFailed { hook: String, code: Option<i32> },

    #[error("Failed to run hook '{hook}': {source}")]
    HookSpawn {
        hook: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),
}

/// Errors from assembling or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid merged configuration: {0}")]
    Deserialize(#[source] toml::de::Error),

    #[error("Unknown provider: {0}. Supported: openai, anthropic, gemini")]
    UnknownProvider(String),

    #[error("API key for {provider} not found. Set the {env_var} environment variable")]
    MissingApiKey {
        provider: String,
        env_var: &'static str,
    },

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

/// Errors from a remote text-generation call.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("{provider} request failed: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} rejected the credentials (HTTP {status}): {body}")]
    Authentication {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("{provider} API returned HTTP {status}: {body}")]
    Api {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("{provider} returned an unexpected response: {detail}")]
    MalformedResponse {
        provider: &'static str,
        detail: String,
    },
}

impl ProviderError {
    /// Classify a non-success HTTP status for `provider`.
    pub fn from_status(provider: &'static str, status: reqwest::StatusCode, body: String) -> Self {
        let status = status.as_u16();
        if status == 401 || status == 403 {
            Self::Authentication {
                provider,
                status,
                body,
            }
        } else {
            Self::Api {
                provider,
                status,
                body,
            }
        }
    }
}

/// The user aborted an interactive prompt.
#[derive(Error, Debug)]
#[error("Interrupted by user")]
pub struct Interrupted;
