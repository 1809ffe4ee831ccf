//! Diff compression.
//!
//! Turns a list of [`FileChange`]s into a bounded block of text that fits a
//! model prompt. The heuristics here are plain substring matching, not a
//! parser, and they are expected to both over- and under-select lines.

use crate::context::{ChangeKind, FileChange, ReviewLevel};
use std::fmt::{self, Write};
use strum_macros::Display;

/// Total changed lines above which everything but `Detailed` gets a summary
pub const SUMMARY_THRESHOLD: usize = 500;
/// Total changed lines above which `Quick` gets the minimal listing
pub const MINIMAL_THRESHOLD: usize = 200;

const MAX_SEGMENT_LINES: usize = 30;
const SUMMARY_FILES_PER_GROUP: usize = 2;
const MINIMAL_KEY_LINES: usize = 5;
const FALLBACK_KEY_LINES: usize = 10;
const DIFF_LINE_WIDTH: usize = 100;
const SIGNATURE_WIDTH: usize = 120;

/// Lines whose trimmed, lower-cased form starts with one of these are noise
const NOISE_PREFIXES: &[&str] = &[
    "import ", "from ", "#", "//", "/*", "*/", "{", "}", "(", ")", "[", "]", ";", "\"\"\"",
    "'''", "pass", "console.log",
];

/// A line must contain one of these to be kept
const SIGNAL_TOKENS: &[&str] = &[
    "def ", "class ", "function ", "return ", "if ", "else", "for ", "while ", "try", "catch",
    "=", "await ", "async ", "@",
];

/// Definition markers for signature lines in new files
const SIGNATURE_KEYWORDS: &[&str] = &[
    "def ", "class ", "function ", "const ", "let ", "var ", "public ", "private ",
    "protected ", "async ", "@",
];

/// Checked first; any hit makes the file low priority
const LOW_PRIORITY_PATTERNS: &[&str] = &[
    "test_",
    "_test.",
    ".test.",
    "spec.",
    ".spec.",
    "config.",
    "setup.",
    "requirements.",
    ".md",
    ".txt",
    ".yml",
    ".yaml",
    ".json",
    "migration",
    "__init__",
];

const HIGH_PRIORITY_PATTERNS: &[&str] = &[
    "service",
    "controller",
    "api",
    "model",
    "handler",
    "middleware",
    "auth",
    "security",
];

/// Which rendering the compressor picked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum CompressionMode {
    /// Per-extension aggregates for very large change sets
    Summary,
    /// Path, stats and a handful of key lines per file
    Minimal,
    /// Priority-aware per-file excerpts
    Smart,
}

/// Importance of a file judged from its path alone
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display)]
#[strum(serialize_all = "lowercase")]
pub enum FilePriority {
    Low,
    Normal,
    High,
}

/// Bounded text built from a set of changes, ready to embed in a prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedReport {
    text: String,
    mode: CompressionMode,
}

impl CompressedReport {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub const fn mode(&self) -> CompressionMode {
        self.mode
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Rough cost proxy: characters divided by four
    pub fn token_estimate(&self) -> usize {
        self.text.chars().count() / 4
    }
}

impl fmt::Display for CompressedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Compresses `changes` for the given verbosity.
///
/// The mode is chosen from the total number of changed lines:
/// more than [`SUMMARY_THRESHOLD`] gives a summary unless `level` is
/// `Detailed`, more than [`MINIMAL_THRESHOLD`] at `Quick` gives the minimal
/// listing, and anything else gets smart per-file excerpts.
pub fn compress(changes: &[FileChange], level: ReviewLevel) -> CompressedReport {
    let total_lines: usize = changes.iter().map(FileChange::changed_lines).sum();

    let (mode, text) = if total_lines > SUMMARY_THRESHOLD && level != ReviewLevel::Detailed {
        (CompressionMode::Summary, compress_summary(changes))
    } else if total_lines > MINIMAL_THRESHOLD && level == ReviewLevel::Quick {
        (CompressionMode::Minimal, compress_minimal(changes))
    } else {
        (CompressionMode::Smart, compress_smart(changes, level))
    };

    CompressedReport { text, mode }
}

fn compress_summary(changes: &[FileChange]) -> String {
    let mut groups: Vec<(&str, Vec<&FileChange>)> = Vec::new();
    for change in changes {
        let ext = extension_group(change.path());
        match groups.iter_mut().find(|(group, _)| *group == ext) {
            Some((_, files)) => files.push(change),
            None => groups.push((ext, vec![change])),
        }
    }

    let mut out = String::from("⚠️  Large change set detected, summary only\n\n");
    for (ext, mut files) in groups {
        let insertions: usize = files.iter().map(|f| f.insertions()).sum();
        let deletions: usize = files.iter().map(|f| f.deletions()).sum();
        writeln!(
            out,
            "📁 .{ext} files: {} (+{insertions}/-{deletions})",
            files.len()
        )
        .expect("writing to string should never fail");

        files.sort_by(|a, b| b.changed_lines().cmp(&a.changed_lines()));
        for file in files.iter().take(SUMMARY_FILES_PER_GROUP) {
            writeln!(
                out,
                "  • {} (+{}/-{})",
                file.path(),
                file.insertions(),
                file.deletions()
            )
            .expect("writing to string should never fail");
        }
    }
    out
}

fn compress_minimal(changes: &[FileChange]) -> String {
    let mut out = String::from("📝 Changed files:\n");
    for change in changes {
        writeln!(
            out,
            "\n• {} ({}) +{}/-{}",
            change.path(),
            change.kind().code(),
            change.insertions(),
            change.deletions()
        )
        .expect("writing to string should never fail");

        let key_lines = extract_key_changes(change.diff(), MINIMAL_KEY_LINES);
        if !key_lines.is_empty() {
            out.push_str("  Key changes:\n");
            for line in key_lines {
                writeln!(out, "    {line}").expect("writing to string should never fail");
            }
        }
    }
    out
}

fn compress_smart(changes: &[FileChange], level: ReviewLevel) -> String {
    let mut out = String::new();
    for change in changes {
        if level == ReviewLevel::Quick && file_priority(change.path()) == FilePriority::Low {
            continue;
        }

        writeln!(
            out,
            "\n━━━ {} ({}) +{}/-{}",
            change.path(),
            change.kind().code(),
            change.insertions(),
            change.deletions()
        )
        .expect("writing to string should never fail");

        if !change.diff().is_empty() {
            out.push_str(&compress_diff_content(change.diff(), level, change.kind()));
            out.push('\n');
        }
    }
    out
}

/// Excerpt of one file's diff, at most 30 lines
fn compress_diff_content(diff: &str, level: ReviewLevel, kind: ChangeKind) -> String {
    let mut segment: Vec<String> = Vec::new();

    if kind == ChangeKind::Added {
        let signatures = extract_signatures(diff);
        if signatures.is_empty() {
            segment.extend(extract_key_changes(diff, FALLBACK_KEY_LINES));
        } else {
            let limit = if level == ReviewLevel::Detailed { 15 } else { 8 };
            segment.push("New definitions:".to_string());
            segment.extend(signatures.into_iter().take(limit));
        }
    } else {
        let mut additions = Vec::new();
        let mut deletions = Vec::new();
        for line in diff.split('\n') {
            if let Some(rest) = added_line(line) {
                let clean = rest.trim();
                if is_important(clean) {
                    additions.push(format!("+ {}", truncate_chars(clean, DIFF_LINE_WIDTH)));
                }
            } else if let Some(rest) = removed_line(line) {
                let clean = rest.trim();
                if is_important(clean) {
                    deletions.push(format!("- {}", truncate_chars(clean, DIFF_LINE_WIDTH)));
                }
            }
        }

        let max_lines = if level == ReviewLevel::Detailed { 20 } else { 10 };
        if !deletions.is_empty() {
            segment.push("Removed:".to_string());
            segment.extend(deletions.into_iter().take(max_lines / 2));
        }
        if !additions.is_empty() {
            segment.push("Added:".to_string());
            segment.extend(additions.into_iter().take(max_lines / 2));
        }
    }

    segment.truncate(MAX_SEGMENT_LINES);
    segment.join("\n")
}

/// Whether a diff line carries signal worth showing to the model.
///
/// Rejects lines shorter than three characters after trimming and lines
/// that start with an import, comment or bracket token. Everything else is
/// kept only when it contains a definition, control-flow, assignment,
/// async or decorator marker.
pub fn is_important(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.chars().count() < 3 {
        return false;
    }

    let lower = trimmed.to_lowercase();
    if NOISE_PREFIXES
        .iter()
        .any(|noise| lower.starts_with(noise) || lower == *noise)
    {
        return false;
    }

    SIGNAL_TOKENS.iter().any(|token| trimmed.contains(token))
}

/// Classifies a path as low, normal or high priority.
///
/// Test, config and documentation-like paths are low even when they also
/// match a high-priority word.
pub fn file_priority(path: &str) -> FilePriority {
    let lower = path.to_lowercase();
    if LOW_PRIORITY_PATTERNS.iter().any(|p| lower.contains(p)) {
        FilePriority::Low
    } else if HIGH_PRIORITY_PATTERNS.iter().any(|p| lower.contains(p)) {
        FilePriority::High
    } else {
        FilePriority::Normal
    }
}

/// Definition-like lines of a diff, leading `+` markers stripped
pub fn extract_signatures(diff: &str) -> Vec<String> {
    diff.split('\n')
        .map(|line| line.trim_start_matches('+').trim())
        .filter(|clean| SIGNATURE_KEYWORDS.iter().any(|kw| clean.contains(kw)))
        .filter(|clean| clean.contains('(') || clean.contains("class "))
        .map(|clean| truncate_chars(clean, SIGNATURE_WIDTH).to_string())
        .collect()
}

/// Up to `limit` important added lines, rendered as `+ line`
fn extract_key_changes(diff: &str, limit: usize) -> Vec<String> {
    diff.split('\n')
        .filter_map(added_line)
        .map(str::trim)
        .filter(|clean| is_important(clean))
        .take(limit)
        .map(|clean| format!("+ {}", truncate_chars(clean, DIFF_LINE_WIDTH)))
        .collect()
}

fn added_line(line: &str) -> Option<&str> {
    if line.starts_with("+++") {
        None
    } else {
        line.strip_prefix('+')
    }
}

fn removed_line(line: &str) -> Option<&str> {
    if line.starts_with("---") {
        None
    } else {
        line.strip_prefix('-')
    }
}

fn extension_group(path: &str) -> &str {
    path.rsplit_once('.').map_or("other", |(_, ext)| ext)
}

fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
