//! Prompt templates for the two generation tasks.
//!
//! One fixed template per (task, level) pair. The only variable parts are the
//! compressed report and the style settings from [`Config`].

use crate::compressor::CompressedReport;
use crate::config::Config;
use crate::context::ReviewLevel;

/// What the model is being asked to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    CommitMessage,
    Review,
}

impl Task {
    /// System prompt sent alongside every request for this task
    pub const fn system_prompt(self) -> &'static str {
        match self {
            Self::CommitMessage => {
                "You are an expert at writing clear, concise Git commit messages following best practices and Conventional Commits format."
            }
            Self::Review => "You are an expert code reviewer. Provide concise, actionable feedback.",
        }
    }
}

/// Renders the user prompt for `task` at `level` around the compressed report
pub fn build_prompt(
    report: &CompressedReport,
    level: ReviewLevel,
    task: Task,
    config: &Config,
) -> String {
    match task {
        Task::CommitMessage => commit_prompt(report.text(), level, config),
        Task::Review => review_prompt(report.text(), level, &config.language),
    }
}

fn commit_prompt(diff: &str, level: ReviewLevel, config: &Config) -> String {
    let max_subject = config.commit.max_subject_length;
    let format_rules = if config.commit.conventional_commits {
        format!(
            "Use the Conventional Commits format: `<type>(<optional scope>): <description>`.\n\
             Allowed types: {}.\n\
             - feat: new behavior (new functions, endpoints, options)\n\
             - fix: a bug fix\n\
             - refactor: restructuring with no behavior change\n\
             Lowercase after the colon, no trailing period.",
            config.commit.types.join(", ")
        )
    } else {
        "Write the subject in the imperative mood (\"add\", \"fix\", \"remove\"), no trailing period."
            .to_string()
    };

    let shape = match level {
        ReviewLevel::Quick => "Write ONLY the subject line. No body.".to_string(),
        ReviewLevel::Normal => {
            "Write the subject line. If the change touches several things, add a blank line and \
             2-4 short bullet points naming them."
                .to_string()
        }
        ReviewLevel::Detailed => {
            "Write the subject line, a blank line, then a body of short paragraphs or bullet points \
             explaining what changed and why. Wrap body lines at 72 characters."
                .to_string()
        }
    };

    format!(
        "Write ONE specific commit message for the changes below.\n\n\
         Rules:\n\
         1. Be specific: name the functions, classes or files that changed.\n\
         2. Avoid vague words: implement, functionality, improve, update, change, logic.\n\
         3. The subject line must be at most {max_subject} characters.\n\
         4. Write the message in {language}.\n\n\
         {format_rules}\n\n\
         {shape}\n\n\
         Code changes:\n\
         {diff}\n\n\
         Output only the commit message, without code fences, quotes or commentary.",
        language = config.language,
    )
}

fn review_prompt(diff: &str, level: ReviewLevel, language: &str) -> String {
    match level {
        ReviewLevel::Quick => format!(
            "Quick code review - ONLY report critical issues:\n\n\
             Code changes:\n\
             {diff}\n\n\
             Focus on:\n\
             ❌ Bugs (null dereference, logic errors)\n\
             ⚠️  Security issues\n\
             🔥 Performance problems\n\n\
             Format ({language}):\n\
             - Use ✅/⚠️/❌ symbols\n\
             - Max 3 items\n\
             - Be specific and brief\n\n\
             If no issues: \"✅ No issues found\"\n"
        ),
        ReviewLevel::Normal => format!(
            "Code review - balanced detail:\n\n\
             Code changes:\n\
             {diff}\n\n\
             Review:\n\
             ❌ Critical: bugs, security\n\
             ⚠️  Warning: potential issues, edge cases\n\
             💡 Suggestion: code quality, naming\n\n\
             Format ({language}):\n\
             - Group by severity\n\
             - Be specific with line context\n\
             - Max 5-7 items total\n\n\
             If mostly good: \"✅ Looks good overall\" plus any warnings\n"
        ),
        ReviewLevel::Detailed => format!(
            "Detailed code review:\n\n\
             Code changes:\n\
             {diff}\n\n\
             Analyze:\n\
             🐛 Bugs & logic errors\n\
             🔒 Security vulnerabilities\n\
             ⚡ Performance issues\n\
             🏗️  Architecture & design patterns\n\
             📝 Code quality & readability\n\
             ✨ Best practices\n\n\
             Format ({language}):\n\
             - Organized by category, most severe first\n\
             - Specific examples with context\n\
             - Actionable recommendations\n\n\
             Provide thorough analysis.\n"
        ),
    }
}
