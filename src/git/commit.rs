use crate::error::RepositoryError;
use crate::git::files::head_tree;
use crate::log_debug;
use git2::{Delta, FileMode, Repository};

/// Results from a commit operation
#[derive(Debug)]
pub struct CommitResult {
    pub branch: String,
    pub commit_hash: String,
    pub files_changed: usize,
    pub insertions: usize,
    pub deletions: usize,
    pub new_files: Vec<(String, FileMode)>,
}

/// Commits the current index with `message`.
///
/// Works on an unborn branch by creating a root commit.
pub fn commit(repo: &Repository, message: &str) -> Result<CommitResult, RepositoryError> {
    let signature = repo.signature()?;
    let mut index = repo.index()?;
    let tree_id = index.write_tree()?;
    let tree = repo.find_tree(tree_id)?;

    let parent_tree = head_tree(repo)?;
    let parent_commit = if parent_tree.is_some() {
        Some(repo.head()?.peel_to_commit()?)
    } else {
        None
    };
    let parents: Vec<&git2::Commit<'_>> = parent_commit.iter().collect();

    let commit_oid = repo.commit(
        Some("HEAD"),
        &signature,
        &signature,
        message,
        &tree,
        &parents,
    )?;
    log_debug!("Created commit {}", commit_oid);

    let branch = repo.head()?.shorthand().unwrap_or("HEAD").to_string();
    let commit_hash = commit_oid.to_string().chars().take(7).collect();

    let diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;
    let stats = diff.stats()?;

    let new_files = diff
        .deltas()
        .filter(|delta| delta.status() == Delta::Added)
        .filter_map(|delta| {
            let file = delta.new_file();
            file.path()
                .map(|p| (p.to_string_lossy().into_owned(), file.mode()))
        })
        .collect();

    Ok(CommitResult {
        branch,
        commit_hash,
        files_changed: stats.files_changed(),
        insertions: stats.insertions(),
        deletions: stats.deletions(),
        new_files,
    })
}
