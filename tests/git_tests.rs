use anyhow::Result;
use auto_commit::context::ChangeKind;
use auto_commit::error::RepositoryError;
use auto_commit::git::{GitRepo, repo_relative_path};
use git2::Repository;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

#[path = "test_utils.rs"]
mod test_utils;
use test_utils::{
    create_and_stage_file, numbered_lines, setup_empty_git_repo, setup_git_repo, stage,
    write_file,
};

#[test]
fn test_open_outside_repository() {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let err = GitRepo::open(temp_dir.path()).expect_err("Opening a plain directory should fail");
    assert!(matches!(err, RepositoryError::NotARepository { .. }));
}

#[test]
fn test_open_discovers_from_subdirectory() -> Result<()> {
    let (temp_dir, _) = setup_git_repo();
    let nested = temp_dir.path().join("src").join("deep");
    fs::create_dir_all(&nested)?;

    let repo = GitRepo::open(&nested)?;
    assert_eq!(
        repo.repo_path().canonicalize()?,
        temp_dir.path().canonicalize()?
    );
    Ok(())
}

#[test]
fn test_clean_tree_has_no_changes() -> Result<()> {
    let (_temp_dir, git_repo) = setup_git_repo();
    assert!(!git_repo.has_changes()?);

    let changes = git_repo.read_changes(true)?;
    assert!(changes.is_empty());
    Ok(())
}

#[test]
fn test_staged_and_unstaged_partitions() -> Result<()> {
    let (temp_dir, git_repo) = setup_git_repo();
    let root = temp_dir.path();

    create_and_stage_file(root, "staged.rs", "fn staged() {}\n");
    write_file(root, "initial.txt", "Initial content\nMore content\n");

    assert!(git_repo.has_changes()?);
    let changes = git_repo.read_changes(true)?;

    assert_eq!(changes.staged().len(), 1);
    let staged = &changes.staged()[0];
    assert_eq!(staged.path(), "staged.rs");
    assert_eq!(staged.kind(), ChangeKind::Added);
    assert_eq!(staged.insertions(), 1);

    assert_eq!(changes.unstaged().len(), 1);
    let unstaged = &changes.unstaged()[0];
    assert_eq!(unstaged.path(), "initial.txt");
    assert_eq!(unstaged.kind(), ChangeKind::Modified);
    assert_eq!(unstaged.insertions(), 1);
    assert_eq!(unstaged.deletions(), 0);
    assert!(unstaged.diff().contains("+More content"));

    assert_eq!(changes.total_files(), 2);
    assert_eq!(changes.total_insertions(), 2);
    Ok(())
}

#[test]
fn test_untracked_file_counts_every_line() -> Result<()> {
    let (temp_dir, git_repo) = setup_git_repo();
    write_file(temp_dir.path(), "src/auth.py", &numbered_lines("token", 10));

    let changes = git_repo.read_changes(true)?;
    assert_eq!(changes.unstaged().len(), 1);

    let file = &changes.unstaged()[0];
    assert_eq!(file.path(), "src/auth.py");
    assert_eq!(file.kind(), ChangeKind::Added);
    assert_eq!(file.insertions(), 10);
    assert_eq!(file.deletions(), 0);
    assert_eq!(file.diff().lines().filter(|l| l.starts_with('+')).count(), 10);
    Ok(())
}

#[test]
fn test_untracked_files_skipped_when_not_requested() -> Result<()> {
    let (temp_dir, git_repo) = setup_git_repo();
    write_file(temp_dir.path(), "notes.md", "# Notes\n");

    let changes = git_repo.read_changes(false)?;
    assert!(changes.is_empty());
    Ok(())
}

#[test]
fn test_staged_empty_file_keeps_index_content() -> Result<()> {
    let (temp_dir, git_repo) = setup_git_repo();
    create_and_stage_file(temp_dir.path(), "new.py", "");
    write_file(temp_dir.path(), "new.py", "a = 1\nb = 2\n");

    let changes = git_repo.read_changes(true)?;
    assert_eq!(changes.staged().len(), 1);
    let staged = &changes.staged()[0];
    assert_eq!(staged.kind(), ChangeKind::Added);
    assert_eq!(staged.insertions(), 0);
    assert!(!staged.diff().contains("a = 1"));

    assert_eq!(changes.unstaged().len(), 1);
    let unstaged = &changes.unstaged()[0];
    assert_eq!(unstaged.kind(), ChangeKind::Modified);
    assert_eq!(unstaged.insertions(), 2);

    assert_eq!(changes.total_insertions(), 2);
    Ok(())
}

#[test]
fn test_file_filter_from_subdirectory() -> Result<()> {
    let (temp_dir, git_repo) = setup_git_repo();
    let root = temp_dir.path();
    create_and_stage_file(root, "pkg/a.rs", "pub fn a() {}\n");
    create_and_stage_file(root, "pkg/b.rs", "pub fn b() {}\n");

    let mut changes = git_repo.read_changes(false)?;
    let wanted = vec![repo_relative_path(git_repo.repo_path(), &root.join("pkg"), "a.rs")];
    changes.retain_paths(&wanted);

    let paths: Vec<&str> = changes.files().map(|f| f.path()).collect();
    assert_eq!(paths, vec!["pkg/a.rs"]);
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_untracked_symlink_is_not_followed() -> Result<()> {
    let (temp_dir, git_repo) = setup_git_repo();
    let outside = TempDir::new()?;
    let secret = outside.path().join("secret.env");
    fs::write(&secret, "API_KEY = sk-live-123\nOTHER = 2\nTHIRD = 3\n")?;
    std::os::unix::fs::symlink(&secret, temp_dir.path().join("link"))?;

    let changes = git_repo.read_changes(true)?;
    assert_eq!(changes.unstaged().len(), 1);

    let link = &changes.unstaged()[0];
    assert_eq!(link.path(), "link");
    assert_eq!(link.kind(), ChangeKind::Added);
    assert_eq!(link.insertions(), 1);
    assert_eq!(link.diff(), format!("+{}\n", secret.display()));
    assert!(!link.diff().contains("sk-live-123"));
    Ok(())
}

#[test]
fn test_deleted_file_is_reported() -> Result<()> {
    let (temp_dir, git_repo) = setup_git_repo();
    fs::remove_file(temp_dir.path().join("initial.txt"))?;

    let changes = git_repo.read_changes(true)?;
    let file = &changes.unstaged()[0];
    assert_eq!(file.path(), "initial.txt");
    assert_eq!(file.kind(), ChangeKind::Deleted);
    assert_eq!(file.deletions(), 1);
    assert_eq!(file.insertions(), 0);
    Ok(())
}

#[test]
fn test_staged_rename_detected() -> Result<()> {
    let (temp_dir, git_repo) = setup_git_repo();
    let root = temp_dir.path();
    let repo = Repository::open(root)?;

    fs::rename(root.join("initial.txt"), root.join("renamed.txt"))?;
    let mut index = repo.index()?;
    index.remove_path(Path::new("initial.txt"))?;
    index.add_path(Path::new("renamed.txt"))?;
    index.write()?;

    let changes = git_repo.read_changes(true)?;
    assert_eq!(changes.staged().len(), 1);
    let file = &changes.staged()[0];
    assert_eq!(file.path(), "renamed.txt");
    assert_eq!(file.kind(), ChangeKind::Renamed);
    assert_eq!(file.changed_lines(), 0);
    assert!(file.diff().is_empty());
    Ok(())
}

#[test]
fn test_binary_file_has_no_body() -> Result<()> {
    let (temp_dir, git_repo) = setup_git_repo();
    fs::write(temp_dir.path().join("logo.png"), [0x89, b'P', b'N', b'G', 0, 0, 1, 2])?;

    let changes = git_repo.read_changes(true)?;
    let file = &changes.unstaged()[0];
    assert_eq!(file.path(), "logo.png");
    assert_eq!(file.insertions(), 0);
    assert_eq!(file.deletions(), 0);
    assert!(file.diff().is_empty());
    Ok(())
}

#[test]
fn test_exclude_patterns_filter_changes() -> Result<()> {
    let (temp_dir, git_repo) = setup_git_repo();
    let root = temp_dir.path();
    write_file(root, "debug.log", "noise\n");
    write_file(root, "pkg/__pycache__/mod.cpython-312.pyc", "cache\n");
    write_file(root, ".env", "SECRET=1\n");
    write_file(root, "app.py", "print('hi')\n");

    let git_repo =
        git_repo.with_exclude_patterns(&["*.log", "*.tmp", ".env", "__pycache__/"]);
    let changes = git_repo.read_changes(true)?;

    let paths: Vec<&str> = changes.files().map(|f| f.path()).collect();
    assert_eq!(paths, vec!["app.py"]);
    Ok(())
}

#[test]
fn test_unborn_branch_reads_and_commits() -> Result<()> {
    let (temp_dir, git_repo) = setup_empty_git_repo();
    create_and_stage_file(temp_dir.path(), "README.md", "# Project\n\nHello\n");

    let changes = git_repo.read_changes(true)?;
    assert_eq!(changes.staged().len(), 1);
    assert_eq!(changes.staged()[0].kind(), ChangeKind::Added);
    assert_eq!(changes.staged()[0].insertions(), 3);

    let result = git_repo.commit("docs: add readme")?;
    assert_eq!(result.files_changed, 1);
    assert_eq!(result.insertions, 3);
    assert_eq!(result.commit_hash.len(), 7);
    assert_eq!(result.new_files.len(), 1);
    assert_eq!(result.new_files[0].0, "README.md");

    let repo = Repository::open(temp_dir.path())?;
    let head = repo.head()?.peel_to_commit()?;
    assert_eq!(head.parent_count(), 0);
    assert_eq!(head.message(), Some("docs: add readme"));
    Ok(())
}

#[test]
fn test_stage_paths_then_commit() -> Result<()> {
    let (temp_dir, git_repo) = setup_git_repo();
    let root = temp_dir.path();
    write_file(root, "new.rs", "pub fn new() {}\n");
    fs::remove_file(root.join("initial.txt"))?;

    let before = git_repo.read_changes(true)?;
    assert_eq!(before.unstaged().len(), 2);
    git_repo.stage_paths(&before.unstaged_paths())?;

    let after = git_repo.read_changes(false)?;
    assert!(after.unstaged().is_empty());
    assert_eq!(after.staged().len(), 2);

    let result = git_repo.commit("refactor: replace initial file")?;
    assert_eq!(result.files_changed, 2);
    assert_eq!(result.insertions, 1);
    assert_eq!(result.deletions, 1);
    assert!(!git_repo.has_changes()?);
    Ok(())
}

#[test]
fn test_commit_leaves_unstaged_changes() -> Result<()> {
    let (temp_dir, git_repo) = setup_git_repo();
    let root = temp_dir.path();
    let repo = Repository::open(root)?;

    write_file(root, "a.txt", "a\n");
    write_file(root, "b.txt", "b\n");
    stage(&repo, "a.txt");

    git_repo.commit("chore: add a")?;

    let remaining = git_repo.read_changes(true)?;
    assert!(remaining.staged().is_empty());
    assert_eq!(remaining.unstaged_paths(), vec!["b.txt".to_string()]);
    Ok(())
}

#[cfg(unix)]
mod hooks {
    use super::*;
    use super::test_utils::create_hook;

    #[test]
    fn test_missing_hook_is_ok() -> Result<()> {
        let (_temp_dir, git_repo) = setup_git_repo();
        git_repo.execute_hook("pre-commit")?;
        Ok(())
    }

    #[test]
    fn test_successful_hook() -> Result<()> {
        let (temp_dir, git_repo) = setup_git_repo();
        create_hook(temp_dir.path(), "pre-commit", "touch hook-ran");

        git_repo.execute_hook("pre-commit")?;
        assert!(temp_dir.path().join("hook-ran").exists());
        Ok(())
    }

    #[test]
    fn test_failing_hook_reports_exit_code() {
        let (temp_dir, git_repo) = setup_git_repo();
        create_hook(temp_dir.path(), "pre-commit", "exit 3");

        let err = git_repo
            .execute_hook("pre-commit")
            .expect_err("Failing hook should be an error");
        assert!(matches!(
            err,
            RepositoryError::HookFailed { code: Some(3), .. }
        ));
    }
}
