//! auto-commit - commit messages and quick code reviews from pending Git changes
//!
//! The pipeline reads staged and unstaged changes, compresses them into a
//! bounded report, wraps the report in a prompt and sends it to one of the
//! supported model providers.

#![allow(clippy::uninlined_format_args)] // Style preference
#![allow(clippy::format_push_string)] // Performance improvement but stylistic
#![allow(clippy::return_self_not_must_use)] // Builder pattern is clear enough
#![allow(clippy::items_after_statements)] // Locally-scoped use statements are fine

pub mod cli;
pub mod commit;
pub mod compressor;
pub mod config;
pub mod context;
pub mod error;
pub mod git;
pub mod llm_providers;
pub mod logger;
pub mod prompt;
pub mod providers;
pub mod ui;

pub use commit::{AutoCommitService, GeneratedMessage, format_commit_message};
pub use compressor::{CompressedReport, CompressionMode, compress};
pub use config::Config;
pub use context::{ChangeKind, ChangeSet, FileChange, ReviewLevel};
pub use providers::Provider;
