use crate::error::RepositoryError;
use crate::{log_debug, log_warn};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::fmt::Write;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Determines if raw file content looks binary (contains a NUL byte).
pub fn is_binary_content(bytes: &[u8]) -> bool {
    bytes.contains(&0)
}

/// Builds an all-additions diff body for a file that has no baseline.
///
/// Every line of the file becomes one `+` line and counts as one insertion.
/// Binary content yields an empty body and zero insertions. A symlink is
/// never followed: its body is the single line git records, the link target.
pub fn synthesize_added_diff(path: &Path) -> Result<(usize, String), RepositoryError> {
    let read_error = |source: std::io::Error| RepositoryError::FileRead {
        path: path.to_path_buf(),
        source,
    };

    let metadata = fs::symlink_metadata(path).map_err(read_error)?;
    if metadata.file_type().is_symlink() {
        let target = fs::read_link(path).map_err(read_error)?;
        return Ok((1, format!("+{}\n", target.to_string_lossy())));
    }

    let bytes = fs::read(path).map_err(read_error)?;

    if is_binary_content(&bytes) {
        log_debug!("Skipping binary content for {}", path.display());
        return Ok((0, String::new()));
    }

    let content = String::from_utf8_lossy(&bytes);
    let mut diff = String::with_capacity(content.len() + content.len() / 8);
    let mut insertions = 0;
    for line in content.lines() {
        writeln!(diff, "+{line}").expect("writing to string should never fail");
        insertions += 1;
    }

    Ok((insertions, diff))
}

/// Resolves a user-supplied path, relative to `cwd`, into a repository-relative one.
///
/// Paths that land outside `root` come back cleaned but otherwise unchanged,
/// so they simply match nothing.
pub fn repo_relative_path(root: &Path, cwd: &Path, file: &str) -> String {
    let root = fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
    let cwd = fs::canonicalize(cwd).unwrap_or_else(|_| cwd.to_path_buf());
    let absolute = normalize(&cwd.join(file));

    match absolute.strip_prefix(&root) {
        Ok(relative) => relative.to_string_lossy().replace('\\', "/"),
        Err(_) => file.trim_start_matches("./").replace('\\', "/"),
    }
}

/// Lexically drops `.` and resolves `..`; the file itself may no longer exist
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Gitignore-style matcher for `git.exclude_patterns`.
#[derive(Debug, Clone)]
pub struct ExclusionFilter {
    matcher: Gitignore,
}

impl ExclusionFilter {
    /// Compile `patterns` relative to `root`; invalid patterns are skipped with a warning
    pub fn new<S: AsRef<str>>(root: &Path, patterns: &[S]) -> Self {
        let mut builder = GitignoreBuilder::new(root);
        for pattern in patterns {
            if let Err(e) = builder.add_line(None, pattern.as_ref()) {
                log_warn!("Ignoring invalid exclude pattern {:?}: {}", pattern.as_ref(), e);
            }
        }

        let matcher = builder.build().unwrap_or_else(|e| {
            log_warn!("Failed to build exclude matcher: {}", e);
            Gitignore::empty()
        });

        Self { matcher }
    }

    /// A filter that excludes nothing
    pub fn none() -> Self {
        Self {
            matcher: Gitignore::empty(),
        }
    }

    /// Whether a repository-relative path is excluded
    pub fn is_excluded(&self, path: &str) -> bool {
        let excluded = self
            .matcher
            .matched_path_or_any_parents(Path::new(path), false)
            .is_ignore();
        if excluded {
            log_debug!("File excluded: {}", path);
        }
        excluded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exclusion_filter_patterns() {
        let filter = ExclusionFilter::new(
            Path::new("/repo"),
            &["*.log", "*.tmp", ".env", "__pycache__/"],
        );

        assert!(filter.is_excluded("debug.log"));
        assert!(filter.is_excluded("nested/run.tmp"));
        assert!(filter.is_excluded(".env"));
        assert!(filter.is_excluded("pkg/__pycache__/mod.cpython-312.pyc"));
        assert!(!filter.is_excluded("src/main.rs"));
        assert!(!filter.is_excluded(".env.example"));
    }

    #[test]
    fn test_empty_filter_excludes_nothing() {
        assert!(!ExclusionFilter::none().is_excluded("anything.log"));
    }

    #[test]
    fn test_repo_relative_path() {
        let root = tempfile::TempDir::new().expect("Failed to create temporary directory");
        let sub = root.path().join("sub");
        fs::create_dir_all(&sub).expect("Failed to create subdirectory");

        assert_eq!(repo_relative_path(root.path(), &sub, "a.rs"), "sub/a.rs");
        assert_eq!(repo_relative_path(root.path(), &sub, "./b.rs"), "sub/b.rs");
        assert_eq!(repo_relative_path(root.path(), &sub, "../top.rs"), "top.rs");
        assert_eq!(
            repo_relative_path(root.path(), root.path(), "src/x.rs"),
            "src/x.rs"
        );
        assert_eq!(
            repo_relative_path(root.path(), root.path(), "/elsewhere/y.rs"),
            "/elsewhere/y.rs"
        );
    }

    #[test]
    fn test_binary_detection() {
        assert!(is_binary_content(b"PNG\0\x01"));
        assert!(!is_binary_content(b"plain text\n"));
    }
}
