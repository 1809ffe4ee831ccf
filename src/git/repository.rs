use crate::context::ChangeSet;
use crate::error::RepositoryError;
use crate::git::commit::{self, CommitResult};
use crate::git::files;
use crate::git::utils::ExclusionFilter;
use crate::log_debug;
use git2::{Repository, Status, StatusOptions};
use std::path::{Path, PathBuf};
use std::process::Command;

/// A local working tree and the operations auto-commit needs from it.
#[derive(Debug)]
pub struct GitRepo {
    repo_path: PathBuf,
    exclusions: ExclusionFilter,
}

impl GitRepo {
    /// Opens the repository containing `path`.
    ///
    /// Fails with [`RepositoryError::NotARepository`] when no repository is found
    /// and [`RepositoryError::BareRepository`] when it has no working tree.
    pub fn open(path: &Path) -> Result<Self, RepositoryError> {
        let repo = Repository::discover(path).map_err(|source| RepositoryError::NotARepository {
            path: path.to_path_buf(),
            source,
        })?;

        let workdir = repo
            .workdir()
            .ok_or_else(|| RepositoryError::BareRepository {
                path: repo.path().to_path_buf(),
            })?
            .to_path_buf();

        log_debug!("Opened repository at {}", workdir.display());
        Ok(Self {
            repo_path: workdir,
            exclusions: ExclusionFilter::none(),
        })
    }

    /// Drop paths matching gitignore-style `patterns` from every change read
    #[must_use]
    pub fn with_exclude_patterns<S: AsRef<str>>(mut self, patterns: &[S]) -> Self {
        self.exclusions = ExclusionFilter::new(&self.repo_path, patterns);
        self
    }

    /// Open the repository at the stored path
    pub fn open_repo(&self) -> Result<Repository, RepositoryError> {
        Ok(Repository::open(&self.repo_path)?)
    }

    /// Returns the working tree root
    pub fn repo_path(&self) -> &PathBuf {
        &self.repo_path
    }

    /// Reads staged and unstaged changes, optionally including untracked files
    pub fn read_changes(&self, include_untracked: bool) -> Result<ChangeSet, RepositoryError> {
        let repo = self.open_repo()?;
        files::read_changes(&repo, &self.repo_path, include_untracked, &self.exclusions)
    }

    /// Whether anything is staged, modified, deleted or untracked
    pub fn has_changes(&self) -> Result<bool, RepositoryError> {
        let repo = self.open_repo()?;
        let mut opts = StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .exclude_submodules(true);
        let statuses = repo.statuses(Some(&mut opts))?;

        Ok(statuses.iter().any(|entry| {
            let status = entry.status();
            status != Status::CURRENT && !status.contains(Status::IGNORED)
        }))
    }

    /// Stages `paths`; paths missing from disk are removed from the index
    pub fn stage_paths<S: AsRef<str>>(&self, paths: &[S]) -> Result<(), RepositoryError> {
        let repo = self.open_repo()?;
        let mut index = repo.index()?;

        for path in paths {
            let relative = Path::new(path.as_ref());
            if self.repo_path.join(relative).exists() {
                log_debug!("Staging {}", relative.display());
                index.add_path(relative)?;
            } else {
                log_debug!("Staging removal of {}", relative.display());
                index.remove_path(relative)?;
            }
        }

        index.write()?;
        Ok(())
    }

    /// Commits the index with `message`
    pub fn commit(&self, message: &str) -> Result<CommitResult, RepositoryError> {
        let repo = self.open_repo()?;
        commit::commit(&repo, message)
    }

    /// Executes a Git hook if it exists in the repository's hooks directory.
    pub fn execute_hook(&self, hook_name: &str) -> Result<(), RepositoryError> {
        let repo = self.open_repo()?;
        let hook_path = repo.path().join("hooks").join(hook_name);

        if !hook_path.exists() {
            log_debug!("Hook '{}' not found at {:?}", hook_name, hook_path);
            return Ok(());
        }

        log_debug!("Executing hook: {} ({:?})", hook_name, hook_path);
        let status = Command::new(&hook_path)
            .current_dir(&self.repo_path)
            .env("GIT_DIR", repo.path())
            .env("GIT_WORK_TREE", &self.repo_path)
            .status()
            .map_err(|source| RepositoryError::HookSpawn {
                hook: hook_name.to_string(),
                source,
            })?;

        if !status.success() {
            return Err(RepositoryError::HookFailed {
                hook: hook_name.to_string(),
                code: status.code(),
            });
        }

        log_debug!("Hook '{}' executed successfully", hook_name);
        Ok(())
    }
}
