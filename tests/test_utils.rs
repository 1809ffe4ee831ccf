#![allow(dead_code)]

use auto_commit::git::GitRepo;
use git2::Repository;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Creates a temporary Git repository with an initial commit for testing
pub fn setup_git_repo() -> (TempDir, GitRepo) {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let repo = init_repo(temp_dir.path());

    // Create and commit an initial file
    fs::write(temp_dir.path().join("initial.txt"), "Initial content\n")
        .expect("Failed to write initial file");
    stage(&repo, "initial.txt");

    let mut index = repo.index().expect("Failed to get repository index");
    let tree_id = index.write_tree().expect("Failed to write tree");
    let tree = repo.find_tree(tree_id).expect("Failed to find tree");
    let signature = repo.signature().expect("Failed to create signature");
    repo.commit(
        Some("HEAD"),
        &signature,
        &signature,
        "Initial commit",
        &tree,
        &[],
    )
    .expect("Failed to commit");

    let git_repo = GitRepo::open(temp_dir.path()).expect("Failed to open GitRepo");
    (temp_dir, git_repo)
}

/// Creates a temporary repository with no commits yet
pub fn setup_empty_git_repo() -> (TempDir, GitRepo) {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    init_repo(temp_dir.path());
    let git_repo = GitRepo::open(temp_dir.path()).expect("Failed to open GitRepo");
    (temp_dir, git_repo)
}

fn init_repo(path: &Path) -> Repository {
    let repo = Repository::init(path).expect("Failed to initialize repository");

    // Configure git user
    let mut config = repo.config().expect("Failed to get repository config");
    config
        .set_str("user.name", "Test User")
        .expect("Failed to set user name");
    config
        .set_str("user.email", "test@example.com")
        .expect("Failed to set user email");
    repo
}

/// Writes `content` to `name` inside the working tree, creating parent directories
pub fn write_file(root: &Path, name: &str, content: &str) {
    let path = root.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    fs::write(path, content).expect("Failed to write file");
}

/// Adds `name` to the index
pub fn stage(repo: &Repository, name: &str) {
    let mut index = repo.index().expect("Failed to get repository index");
    index
        .add_path(Path::new(name))
        .expect("Failed to add file to index");
    index.write().expect("Failed to write index");
}

/// Writes and stages a file in one step
pub fn create_and_stage_file(root: &Path, name: &str, content: &str) {
    write_file(root, name, content);
    let repo = Repository::open(root).expect("Failed to open repository");
    stage(&repo, name);
}

/// Installs an executable hook script
#[cfg(unix)]
pub fn create_hook(root: &Path, name: &str, body: &str) {
    use std::os::unix::fs::PermissionsExt;

    let hooks_dir = root.join(".git").join("hooks");
    fs::create_dir_all(&hooks_dir).expect("Failed to create hooks directory");
    let hook_path = hooks_dir.join(name);
    fs::write(&hook_path, format!("#!/bin/sh\n{body}\n")).expect("Failed to write hook");
    let mut perms = fs::metadata(&hook_path)
        .expect("Failed to read hook metadata")
        .permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&hook_path, perms).expect("Failed to make hook executable");
}

/// `count` numbered lines of Python-ish code
pub fn numbered_lines(prefix: &str, count: usize) -> String {
    (0..count)
        .map(|i| format!("{prefix}_{i} = compute({i})\n"))
        .collect()
}
