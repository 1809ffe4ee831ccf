use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::{Display, EnumString};

/// How a path changed relative to its baseline.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
    Renamed,
}

impl ChangeKind {
    /// Single-letter status code, as printed by `git status --short`
    pub const fn code(self) -> char {
        match self {
            Self::Added => 'A',
            Self::Modified => 'M',
            Self::Deleted => 'D',
            Self::Renamed => 'R',
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added => write!(f, "Added"),
            Self::Modified => write!(f, "Modified"),
            Self::Deleted => write!(f, "Deleted"),
            Self::Renamed => write!(f, "Renamed"),
        }
    }
}

/// One modified path and its diff body.
///
/// Values are built once per change read and never mutated. A file with
/// zero insertions and deletions always carries an empty diff.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    path: String,
    kind: ChangeKind,
    insertions: usize,
    deletions: usize,
    diff: String,
}

impl FileChange {
    pub fn new(
        path: impl Into<String>,
        kind: ChangeKind,
        insertions: usize,
        deletions: usize,
        diff: impl Into<String>,
    ) -> Self {
        let mut diff = diff.into();
        if insertions + deletions == 0 {
            diff.clear();
        }
        Self {
            path: path.into(),
            kind,
            insertions,
            deletions,
            diff,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub const fn kind(&self) -> ChangeKind {
        self.kind
    }

    pub const fn insertions(&self) -> usize {
        self.insertions
    }

    pub const fn deletions(&self) -> usize {
        self.deletions
    }

    /// Insertions plus deletions
    pub const fn changed_lines(&self) -> usize {
        self.insertions + self.deletions
    }

    pub fn diff(&self) -> &str {
        &self.diff
    }
}

/// Pending changes split into the staged and unstaged partitions.
///
/// Totals are derived on every call so they can never go stale after
/// one of the filtering methods runs.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    staged: Vec<FileChange>,
    unstaged: Vec<FileChange>,
}

impl ChangeSet {
    pub fn new(staged: Vec<FileChange>, unstaged: Vec<FileChange>) -> Self {
        Self { staged, unstaged }
    }

    pub fn staged(&self) -> &[FileChange] {
        &self.staged
    }

    pub fn unstaged(&self) -> &[FileChange] {
        &self.unstaged
    }

    /// Every file in both partitions, staged first
    pub fn files(&self) -> impl Iterator<Item = &FileChange> {
        self.staged.iter().chain(self.unstaged.iter())
    }

    /// Owned copy of every file, used as compressor input
    pub fn all_files(&self) -> Vec<FileChange> {
        self.files().cloned().collect()
    }

    pub fn total_insertions(&self) -> usize {
        self.files().map(FileChange::insertions).sum()
    }

    pub fn total_deletions(&self) -> usize {
        self.files().map(FileChange::deletions).sum()
    }

    pub fn total_files(&self) -> usize {
        self.staged.len() + self.unstaged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total_files() == 0
    }

    /// Keep only files whose path is in `paths`
    pub fn retain_paths<S: AsRef<str>>(&mut self, paths: &[S]) {
        let keep = |file: &FileChange| paths.iter().any(|p| p.as_ref() == file.path());
        self.staged.retain(keep);
        self.unstaged.retain(keep);
    }

    /// Forget the unstaged partition entirely
    pub fn drop_unstaged(&mut self) {
        self.unstaged.clear();
    }

    /// Paths in the unstaged partition
    pub fn unstaged_paths(&self) -> Vec<String> {
        self.unstaged.iter().map(|f| f.path.clone()).collect()
    }
}

/// Verbosity tier for compression and for the requested review length.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    ValueEnum,
    Display,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ReviewLevel {
    #[default]
    Quick,
    Normal,
    Detailed,
}
