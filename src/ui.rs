use crate::context::{ChangeKind, ChangeSet, FileChange};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use parking_lot::Mutex;
use std::time::Duration;

/// Track quiet mode state
static QUIET_MODE: std::sync::LazyLock<Mutex<bool>> =
    std::sync::LazyLock::new(|| Mutex::new(false));

/// Enable or disable quiet mode
pub fn set_quiet_mode(enabled: bool) {
    let mut quiet_mode = QUIET_MODE.lock();
    *quiet_mode = enabled;
}

/// Check if quiet mode is enabled
pub fn is_quiet_mode() -> bool {
    *QUIET_MODE.lock()
}

pub fn create_spinner(message: &str) -> ProgressBar {
    // Don't create a spinner in quiet mode
    if is_quiet_mode() {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    match ProgressStyle::default_spinner()
        .tick_chars("✦✧✶✷✸✹✺✻✼✽")
        .template("{spinner} {msg}")
    {
        Ok(style) => pb.set_style(style),
        Err(_) => pb.set_style(ProgressStyle::default_spinner()),
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

pub fn print_info(message: &str) {
    if !is_quiet_mode() {
        println!("{}", message.cyan().bold());
    }
}

pub fn print_warning(message: &str) {
    if !is_quiet_mode() {
        println!("{}", message.yellow().bold());
    }
}

pub fn print_error(message: &str) {
    // Always print errors, even in quiet mode
    eprintln!("{}", message.red().bold());
}

pub fn print_success(message: &str) {
    if !is_quiet_mode() {
        println!("{}", message.green().bold());
    }
}

/// Print a simple message (respects quiet mode)
pub fn print_message(message: &str) {
    if !is_quiet_mode() {
        println!("{message}");
    }
}

/// Print an empty line (respects quiet mode)
pub fn print_newline() {
    if !is_quiet_mode() {
        println!();
    }
}

/// Print content with a title and decorative borders
pub fn print_bordered_content(title: &str, content: &str) {
    if !is_quiet_mode() {
        println!("{}", format!("━━━ {title} ").bright_purple().bold());
        println!("{content}");
        println!("{}", "━".repeat(50).bright_purple());
    }
}

/// Staged/unstaged counts and line totals
pub fn print_changes_summary(changes: &ChangeSet) {
    if is_quiet_mode() {
        return;
    }

    println!("{}", "📊 Changes".cyan().bold());
    println!("  {:<16}{}", "Staged files", changes.staged().len());
    println!("  {:<16}{}", "Unstaged files", changes.unstaged().len());
    println!("  {:<16}{}", "Total files", changes.total_files());
    println!(
        "  {:<16}{}",
        "Insertions",
        format!("+{}", changes.total_insertions()).green()
    );
    println!(
        "  {:<16}{}",
        "Deletions",
        format!("-{}", changes.total_deletions()).red()
    );
}

/// Per-partition file listing with change markers
pub fn print_file_list(changes: &ChangeSet) {
    if is_quiet_mode() {
        return;
    }

    if !changes.staged().is_empty() {
        println!("\n{}", "Staged files:".cyan().bold());
        changes.staged().iter().for_each(print_file_line);
    }
    if !changes.unstaged().is_empty() {
        println!("\n{}", "Unstaged files:".yellow().bold());
        changes.unstaged().iter().for_each(print_file_line);
    }
}

fn print_file_line(file: &FileChange) {
    let marker = match file.kind() {
        ChangeKind::Added => "+".green(),
        ChangeKind::Modified => "M".yellow(),
        ChangeKind::Deleted => "-".red(),
        ChangeKind::Renamed => "R".blue(),
    };
    println!(
        "  {} {} {}",
        marker,
        file.path(),
        format!("(+{}/-{})", file.insertions(), file.deletions()).dimmed()
    );
}

pub fn print_commit_message(message: &str) {
    print_bordered_content("🤖 Generated commit message", message.trim_end());
}

pub fn print_review(review: &str, token_estimate: usize) {
    print_bordered_content("🔍 Code review", review.trim_end());
    if !is_quiet_mode() {
        println!(
            "{}\n",
            format!("💡 Estimated input: ~{token_estimate} tokens").dimmed()
        );
    }
}
