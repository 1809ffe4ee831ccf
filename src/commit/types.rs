use regex::Regex;
use serde::{Deserialize, Serialize};
use textwrap::wrap;

const BODY_WIDTH: usize = 72;

/// Commit message produced by the model, split into subject and body
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GeneratedMessage {
    /// First non-empty line
    pub subject: String,
    /// Everything after the subject, trimmed; empty when the model wrote one line
    pub body: String,
}

impl GeneratedMessage {
    /// Parses raw model output, dropping code fences and wrapping quotes
    pub fn parse(raw: &str) -> Self {
        let cleaned = strip_wrapping(raw);
        let mut lines = cleaned.lines().skip_while(|line| line.trim().is_empty());
        let subject = lines
            .next()
            .map(|line| strip_quotes(line.trim()).to_string())
            .unwrap_or_default();
        let body = lines.collect::<Vec<_>>().join("\n").trim().to_string();

        Self { subject, body }
    }

    pub fn is_empty(&self) -> bool {
        self.subject.is_empty()
    }

    /// Subject length in characters
    pub fn subject_len(&self) -> usize {
        self.subject.chars().count()
    }

    /// Whether the subject matches `<type>(<scope>)!: <description>` for one of `types`
    pub fn follows_conventional_format<S: AsRef<str>>(&self, types: &[S]) -> bool {
        if types.is_empty() {
            return true;
        }
        let alternatives = types
            .iter()
            .map(|t| regex::escape(t.as_ref()))
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&format!(r"^(?:{alternatives})(?:\([^)]+\))?!?: \S"))
            .is_ok_and(|re| re.is_match(&self.subject))
    }
}

/// Formats a `GeneratedMessage` for `git commit`, wrapping the body at 72 columns
pub fn format_commit_message(message: &GeneratedMessage) -> String {
    let mut formatted = message.subject.clone();
    if message.body.is_empty() {
        formatted.push('\n');
        return formatted;
    }

    formatted.push_str("\n\n");
    for line in message.body.lines() {
        if line.chars().count() <= BODY_WIDTH {
            formatted.push_str(line);
            formatted.push('\n');
            continue;
        }
        for wrapped in wrap(line, BODY_WIDTH) {
            formatted.push_str(&wrapped);
            formatted.push('\n');
        }
    }

    formatted
}

/// Removes a surrounding ``` fence (with optional info string) if the model added one
fn strip_wrapping(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.split_once('\n').map_or("", |(_, rest)| rest);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

fn strip_quotes(line: &str) -> &str {
    for quote in ['"', '\'', '`'] {
        if line.len() >= 2
            && let Some(inner) = line.strip_prefix(quote).and_then(|l| l.strip_suffix(quote))
        {
            return inner;
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strips_fences_and_quotes() {
        let message = GeneratedMessage::parse("```text\n\"feat: add login\"\n\n- add form\n```");
        assert_eq!(message.subject, "feat: add login");
        assert_eq!(message.body, "- add form");
    }

    #[test]
    fn test_parse_single_line() {
        let message = GeneratedMessage::parse("  fix(api): handle empty token  \n");
        assert_eq!(message.subject, "fix(api): handle empty token");
        assert!(message.body.is_empty());
        assert_eq!(format_commit_message(&message), "fix(api): handle empty token\n");
    }

    #[test]
    fn test_conventional_format_check() {
        let types = ["feat", "fix"];
        assert!(GeneratedMessage::parse("feat(auth)!: drop v1 tokens").follows_conventional_format(&types));
        assert!(!GeneratedMessage::parse("docs: update readme").follows_conventional_format(&types));
        assert!(!GeneratedMessage::parse("Added login").follows_conventional_format(&types));
    }

    #[test]
    fn test_body_is_wrapped() {
        let message = GeneratedMessage {
            subject: "refactor: split parser".to_string(),
            body: "word ".repeat(40),
        };
        let formatted = format_commit_message(&message);
        assert!(formatted.lines().all(|line| line.chars().count() <= 72));
        assert!(formatted.starts_with("refactor: split parser\n\n"));
    }
}
