use crate::commit::{AutoCommitOptions, handle_auto_commit};
use crate::context::ReviewLevel;
use crate::log_debug;
use crate::logger::{self, LogOptions};
use crate::providers::Provider;
use crate::ui;
use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, crate_version};
use colored::Colorize;
use std::path::PathBuf;

const LOG_FILE: &str = "auto-commit-debug.log";

/// CLI structure defining the available flags
#[derive(Parser, Debug)]
#[command(
    name = "auto-commit",
    author,
    version = crate_version!(),
    about = "Generate commit messages and quick code reviews from your pending changes",
    after_help = get_dynamic_help(),
    styles = get_styles(),
)]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Generate and show the message without committing
    #[arg(long, help = "Show the generated message without committing")]
    pub dry_run: bool,

    /// Only consider changes already in the index
    #[arg(long, help = "Only use staged changes")]
    pub staged_only: bool,

    /// Restrict the changes sent to the model to these paths
    #[arg(long, num_args = 1.., value_name = "PATH", help = "Only include these files")]
    pub files: Vec<String>,

    /// Skip every confirmation prompt
    #[arg(short = 'y', long = "yes", alias = "auto-yes", help = "Skip confirmation prompts")]
    pub yes: bool,

    /// Use this config file instead of the personal and project files
    #[arg(short = 'c', long, value_name = "FILE", help = "Path to a config file")]
    pub config: Option<PathBuf>,

    /// Never stage unstaged files automatically
    #[arg(long, help = "Do not stage unstaged files automatically")]
    pub no_add: bool,

    /// Print the effective configuration and mirror log output to stdout
    #[arg(short = 'v', long, help = "Verbose output")]
    pub verbose: bool,

    /// Run a code review before generating the message
    #[arg(long, help = "Review the changes before committing")]
    pub review: bool,

    /// Skip the review even when enabled in config
    #[arg(long, conflicts_with = "review", help = "Skip the code review")]
    pub no_review: bool,

    /// Depth of the review
    #[arg(long, value_enum, value_name = "LEVEL", help = "Review depth")]
    pub review_level: Option<ReviewLevel>,

    /// Shorthand for a detailed review
    #[arg(long, help = "Run a detailed review")]
    pub review_detailed: bool,

    /// Review and stop without committing
    #[arg(long, help = "Only review, do not commit")]
    pub review_only: bool,

    /// Override the configured provider for this run
    #[arg(short = 'p', long, value_name = "NAME", help = "AI provider to use")]
    pub provider: Option<String>,

    /// Skip the pre-commit and post-commit hooks
    #[arg(long, help = "Skip Git hooks")]
    pub no_verify: bool,

    /// Suppress non-essential output (spinners, summaries, etc.)
    #[arg(short = 'q', long, help = "Suppress non-essential output")]
    pub quiet: bool,

    /// Log debug messages to a file
    #[arg(short = 'l', long = "log", help = "Log debug messages to a file")]
    pub log: bool,

    /// Specify a custom log file path
    #[arg(long = "log-file", value_name = "FILE", help = "Specify a custom log file path")]
    pub log_file: Option<String>,
}

impl Cli {
    /// Translate parsed flags into the options for one run
    pub fn into_options(self, repo_path: PathBuf) -> AutoCommitOptions {
        AutoCommitOptions {
            repo_path,
            config_path: self.config,
            provider: self.provider,
            files: self.files,
            dry_run: self.dry_run,
            staged_only: self.staged_only,
            auto_yes: self.yes,
            no_add: self.no_add,
            no_verify: self.no_verify,
            verbose: self.verbose,
            review: self.review,
            no_review: self.no_review,
            review_level: self.review_level,
            review_detailed: self.review_detailed,
            review_only: self.review_only,
        }
    }
}

fn get_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Magenta.on_default().bold())
        .usage(AnsiColor::Cyan.on_default().bold())
        .literal(AnsiColor::Green.on_default().bold())
        .placeholder(AnsiColor::Yellow.on_default())
        .valid(AnsiColor::Blue.on_default().bold())
        .invalid(AnsiColor::Red.on_default().bold())
        .error(AnsiColor::Red.on_default().bold())
}

/// Parse the command-line arguments
pub fn parse_args() -> Cli {
    Cli::parse()
}

/// Help footer listing the supported providers and their key variables
fn get_dynamic_help() -> String {
    let providers = Provider::ALL
        .iter()
        .map(|p| format!("{} ({})", p.name().bold(), p.api_key_env()))
        .collect::<Vec<_>>()
        .join(" • ");

    format!("\nAvailable providers: {providers}")
}

/// Main function to parse arguments and run the commit flow
pub async fn main() -> anyhow::Result<()> {
    let cli = parse_args();

    let log_options = LogOptions {
        file: cli
            .log
            .then(|| PathBuf::from(cli.log_file.as_deref().unwrap_or(LOG_FILE))),
        echo: cli.verbose,
        http_trace: cli.verbose,
    };
    logger::configure(&log_options)?;
    log_debug!("Logging configured: {:?}", log_options);

    if cli.quiet {
        ui::set_quiet_mode(true);
    }

    let repo_path = std::env::current_dir()?;
    handle_auto_commit(cli.into_options(repo_path)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_map_to_options() {
        let cli = Cli::try_parse_from([
            "auto-commit",
            "--dry-run",
            "--auto-yes",
            "--files",
            "src/a.rs",
            "src/b.rs",
            "--review-level",
            "detailed",
            "-p",
            "anthropic",
        ])
        .expect("flags should parse");

        let options = cli.into_options(PathBuf::from("."));
        assert!(options.dry_run);
        assert!(options.auto_yes);
        assert_eq!(options.files, vec!["src/a.rs", "src/b.rs"]);
        assert_eq!(options.review_level, Some(ReviewLevel::Detailed));
        assert_eq!(options.provider.as_deref(), Some("anthropic"));
    }

    #[test]
    fn test_review_flags_conflict() {
        assert!(Cli::try_parse_from(["auto-commit", "--review", "--no-review"]).is_err());
    }
}
