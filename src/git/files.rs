use crate::context::{ChangeKind, ChangeSet, FileChange};
use crate::error::RepositoryError;
use crate::git::utils::{ExclusionFilter, synthesize_added_diff};
use crate::{log_debug, log_warn};
use git2::{Delta, Diff, DiffFindOptions, DiffOptions, ErrorCode, Patch, Repository, Tree};
use std::path::Path;

/// Reads the staged and unstaged partitions of the working tree.
///
/// Untracked files are only reported when `include_untracked` is set.
pub fn read_changes(
    repo: &Repository,
    workdir: &Path,
    include_untracked: bool,
    exclusions: &ExclusionFilter,
) -> Result<ChangeSet, RepositoryError> {
    log_debug!("Reading changes (include_untracked: {})", include_untracked);

    let head_tree = head_tree(repo)?;
    let index = repo.index()?;

    let mut staged_diff = repo.diff_tree_to_index(head_tree.as_ref(), Some(&index), None)?;
    let mut find_opts = DiffFindOptions::new();
    find_opts.renames(true);
    staged_diff.find_similar(Some(&mut find_opts))?;

    let mut unstaged_opts = DiffOptions::new();
    unstaged_opts
        .include_untracked(include_untracked)
        .recurse_untracked_dirs(include_untracked);
    let unstaged_diff = repo.diff_index_to_workdir(Some(&index), Some(&mut unstaged_opts))?;

    let staged = collect_file_changes(&staged_diff, workdir, exclusions)?;
    let unstaged = collect_file_changes(&unstaged_diff, workdir, exclusions)?;

    log_debug!(
        "Found {} staged and {} unstaged files",
        staged.len(),
        unstaged.len()
    );
    Ok(ChangeSet::new(staged, unstaged))
}

/// HEAD's tree, or `None` before the first commit
pub fn head_tree(repo: &Repository) -> Result<Option<Tree<'_>>, RepositoryError> {
    match repo.head() {
        Ok(head) => Ok(Some(head.peel_to_tree()?)),
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn collect_file_changes(
    diff: &Diff<'_>,
    workdir: &Path,
    exclusions: &ExclusionFilter,
) -> Result<Vec<FileChange>, RepositoryError> {
    let mut changes = Vec::new();

    for (idx, delta) in diff.deltas().enumerate() {
        let kind = match delta.status() {
            Delta::Added | Delta::Untracked => ChangeKind::Added,
            Delta::Modified | Delta::Typechange | Delta::Conflicted => ChangeKind::Modified,
            Delta::Deleted => ChangeKind::Deleted,
            Delta::Renamed | Delta::Copied => ChangeKind::Renamed,
            Delta::Unmodified | Delta::Ignored | Delta::Unreadable => continue,
        };

        let file = if kind == ChangeKind::Deleted {
            delta.old_file()
        } else {
            delta.new_file()
        };
        let Some(path) = file.path().map(|p| p.to_string_lossy().replace('\\', "/")) else {
            log_warn!("Skipping delta {} without a path", idx);
            continue;
        };

        if exclusions.is_excluded(&path) {
            continue;
        }

        let binary = delta.flags().is_binary()
            || delta.new_file().is_binary()
            || delta.old_file().is_binary();

        let (mut insertions, deletions, mut body) = if binary {
            (0, 0, String::new())
        } else {
            patch_body(diff, idx)?
        };

        // Untracked files have no blob yet, so their body comes from disk.
        // Staged additions keep the index content even when it is empty.
        if delta.status() == Delta::Untracked && insertions == 0 && !binary {
            match synthesize_added_diff(&workdir.join(&path)) {
                Ok((lines, synthesized)) => {
                    insertions = lines;
                    body = synthesized;
                }
                Err(e) => {
                    log_warn!("Skipping {}: {}", path, e);
                    continue;
                }
            }
        }

        changes.push(FileChange::new(path, kind, insertions, deletions, body));
    }

    Ok(changes)
}

/// Line statistics and unified diff text for one delta
fn patch_body(diff: &Diff<'_>, idx: usize) -> Result<(usize, usize, String), RepositoryError> {
    let Some(mut patch) = Patch::from_diff(diff, idx)? else {
        return Ok((0, 0, String::new()));
    };

    let (_, insertions, deletions) = patch.line_stats()?;
    let buf = patch.to_buf()?;
    Ok((insertions, deletions, String::from_utf8_lossy(&buf).into_owned()))
}
