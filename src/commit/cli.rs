use super::format_commit_result;
use super::service::AutoCommitService;
use super::types::{GeneratedMessage, format_commit_message};
use crate::config::{Config, load_dotenv};
use crate::context::{ChangeSet, ReviewLevel};
use crate::error::Interrupted;
use crate::git::{GitRepo, repo_relative_path};
use crate::{log_debug, ui};
use anyhow::{Context, Result, bail};
use dialoguer::{Confirm, Editor, Select};
use std::io::ErrorKind;
use std::path::PathBuf;

/// Everything the command line decides for one run
#[derive(Debug, Clone, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct AutoCommitOptions {
    pub repo_path: PathBuf,
    pub config_path: Option<PathBuf>,
    pub provider: Option<String>,
    pub files: Vec<String>,
    pub dry_run: bool,
    pub staged_only: bool,
    pub auto_yes: bool,
    pub no_add: bool,
    pub no_verify: bool,
    pub verbose: bool,
    pub review: bool,
    pub no_review: bool,
    pub review_level: Option<ReviewLevel>,
    pub review_detailed: bool,
    pub review_only: bool,
}

impl AutoCommitOptions {
    /// Review runs when any review flag is given, or when enabled in config and not vetoed
    pub fn should_review(&self, config: &Config) -> bool {
        self.review
            || self.review_detailed
            || self.review_only
            || (config.review.enabled && !self.no_review)
    }

    /// `--review-detailed` wins over `--review-level`, which wins over the config default
    pub fn review_level(&self, config: &Config) -> ReviewLevel {
        if self.review_detailed {
            ReviewLevel::Detailed
        } else {
            self.review_level.unwrap_or(config.review.default_level)
        }
    }

    fn verify(&self, config: &Config) -> bool {
        config.git.verify && !self.no_verify
    }
}

enum CommitChoice {
    Yes,
    No,
    Edit,
}

#[allow(clippy::too_many_lines)]
pub async fn handle_auto_commit(options: AutoCommitOptions) -> Result<()> {
    log_debug!("Running auto-commit with {:?}", options);
    load_dotenv();

    let repo = GitRepo::open(&options.repo_path).map_err(|e| {
        ui::print_info("Run this command from inside a Git working tree.");
        anyhow::Error::new(e)
    })?;

    let mut config = Config::load(options.config_path.as_deref(), Some(repo.repo_path()))?;
    if let Some(provider) = &options.provider {
        config.provider.clone_from(provider);
    }
    if options.verbose {
        ui::print_message(&format!("Effective configuration: {config:#?}"));
    }

    let repo = repo.with_exclude_patterns(&config.git.exclude_patterns);
    let service = AutoCommitService::from_config(config)?;
    let config = service.config();
    ui::print_info(&format!(
        "Using {} ({})",
        service.provider_name(),
        service.model()
    ));

    if !repo.has_changes()? {
        ui::print_success("✨ Nothing to commit, working tree clean.");
        return Ok(());
    }

    let mut changes = read_filtered(&repo, !options.staged_only, &options)?;
    if changes.is_empty() {
        ui::print_warning("No matching changes to commit.");
        return Ok(());
    }

    ui::print_changes_summary(&changes);
    ui::print_file_list(&changes);
    ui::print_newline();

    if !changes.unstaged().is_empty() {
        let stage = if config.git.auto_add && !options.no_add {
            true
        } else if options.auto_yes {
            false
        } else {
            confirm(
                format!("Stage {} unstaged file(s)?", changes.unstaged().len()),
                true,
            )
            .await?
        };

        if stage {
            repo.stage_paths(&changes.unstaged_paths())?;
            ui::print_success(&format!(
                "Staged {} file(s).",
                changes.unstaged().len()
            ));
            changes = read_filtered(&repo, false, &options)?;
        } else {
            ui::print_info("Unstaged files are left out of this commit.");
        }
        changes.drop_unstaged();
    }

    if changes.is_empty() {
        ui::print_warning("Nothing staged to commit.");
        return Ok(());
    }

    if options.should_review(config) {
        let level = options.review_level(config);
        let spinner = ui::create_spinner(&format!("🔍 Reviewing changes ({level} mode)..."));
        let result = service.review(&changes, level).await;
        spinner.finish_and_clear();

        match result {
            Ok(review) => ui::print_review(&review.review, review.token_estimate()),
            Err(e) if options.review_only => return Err(e).context("Code review failed"),
            Err(e) => {
                ui::print_warning(&format!("⚠️  Code review failed: {e}"));
                ui::print_info("Continuing without a review...");
            }
        }

        if options.review_only {
            ui::print_info("Review only: nothing was committed.");
            return Ok(());
        }
    }

    let verify = options.verify(config);
    if verify && !options.dry_run {
        repo.execute_hook("pre-commit")
            .context("Pre-commit hook failed")?;
    }

    let spinner = ui::create_spinner(&format!(
        "🤖 Asking {} for a commit message...",
        service.provider_name()
    ));
    let generated = service.generate_commit_message(&changes).await;
    spinner.finish_and_clear();
    let generated = generated.context("Failed to generate a commit message")?;

    warn_about_style(&generated, config);
    let mut message = format_commit_message(&generated);
    ui::print_commit_message(&message);

    if options.dry_run {
        ui::print_warning("🔍 Dry run: nothing was committed.");
        return Ok(());
    }

    if !options.auto_yes {
        match choose_commit_action().await? {
            CommitChoice::Yes => {}
            CommitChoice::No => {
                ui::print_warning("Commit cancelled.");
                return Ok(());
            }
            CommitChoice::Edit => {
                let edited = edit_message(message.clone()).await?;
                if edited.trim().is_empty() {
                    bail!("Commit message is empty, aborting commit");
                }
                message = edited;
            }
        }
    }

    let result = repo.commit(&message).context("Failed to commit")?;

    if verify && let Err(e) = repo.execute_hook("post-commit") {
        ui::print_warning(&format!("Post-commit hook failed: {e}"));
    }

    ui::print_success("✅ Committed!");
    ui::print_message(&format_commit_result(&result, &message));
    Ok(())
}

/// Reads changes and applies the `--files` filter; totals are recomputed by `ChangeSet`.
///
/// `--files` paths are taken relative to the directory the command ran in.
fn read_filtered(
    repo: &GitRepo,
    include_untracked: bool,
    options: &AutoCommitOptions,
) -> Result<ChangeSet> {
    let mut changes = repo
        .read_changes(include_untracked)
        .context("Failed to read repository changes")?;

    if options.staged_only {
        changes.drop_unstaged();
    }
    if !options.files.is_empty() {
        let wanted: Vec<String> = options
            .files
            .iter()
            .map(|f| repo_relative_path(repo.repo_path(), &options.repo_path, f))
            .collect();
        changes.retain_paths(&wanted);
    }

    log_debug!(
        "{} file(s) after filtering (+{}/-{})",
        changes.total_files(),
        changes.total_insertions(),
        changes.total_deletions()
    );
    Ok(changes)
}

fn warn_about_style(message: &GeneratedMessage, config: &Config) {
    let max = config.commit.max_subject_length;
    if message.subject_len() > max {
        ui::print_warning(&format!(
            "Subject line is {} characters, longer than the configured {max}.",
            message.subject_len()
        ));
    }
    if config.commit.conventional_commits
        && !message.follows_conventional_format(&config.commit.types)
    {
        ui::print_warning("Subject line does not follow the Conventional Commits format.");
    }
}

fn prompt_error(e: dialoguer::Error) -> anyhow::Error {
    match e {
        dialoguer::Error::IO(io) if io.kind() == ErrorKind::Interrupted => Interrupted.into(),
        other => anyhow::Error::new(other).context("Failed to read from the terminal"),
    }
}

async fn confirm(prompt: String, default: bool) -> Result<bool> {
    tokio::task::spawn_blocking(move || {
        Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()
    })
    .await
    .context("Prompt task failed")?
    .map_err(prompt_error)
}

async fn choose_commit_action() -> Result<CommitChoice> {
    let choice = tokio::task::spawn_blocking(|| {
        Select::new()
            .with_prompt("Commit with this message?")
            .items(&["Yes", "No", "Edit"])
            .default(0)
            .interact()
    })
    .await
    .context("Prompt task failed")?
    .map_err(prompt_error)?;

    Ok(match choice {
        0 => CommitChoice::Yes,
        2 => CommitChoice::Edit,
        _ => CommitChoice::No,
    })
}

/// Opens `$EDITOR` on the message; an unsaved editor session yields an empty message
async fn edit_message(message: String) -> Result<String> {
    let edited = tokio::task::spawn_blocking(move || Editor::new().edit(&message))
        .await
        .context("Editor task failed")?
        .map_err(prompt_error)?;
    Ok(edited.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_trigger_and_level() {
        let mut config = Config::default();
        let mut options = AutoCommitOptions::default();
        assert!(!options.should_review(&config));

        config.review.enabled = true;
        assert!(options.should_review(&config));
        assert_eq!(options.review_level(&config), ReviewLevel::Quick);

        options.no_review = true;
        assert!(!options.should_review(&config));

        options.review_only = true;
        options.review_level = Some(ReviewLevel::Normal);
        assert!(options.should_review(&config));
        assert_eq!(options.review_level(&config), ReviewLevel::Normal);

        options.review_detailed = true;
        assert_eq!(options.review_level(&config), ReviewLevel::Detailed);
    }

    #[test]
    fn test_no_verify_disables_hooks() {
        let config = Config::default();
        let options = AutoCommitOptions {
            no_verify: true,
            ..AutoCommitOptions::default()
        };
        assert!(!options.verify(&config));
        assert!(AutoCommitOptions::default().verify(&config));
    }
}
