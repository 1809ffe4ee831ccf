// Git module: the change reader and the commit side of the working tree

mod commit;
mod files;
mod repository;
mod utils;

pub use commit::CommitResult;
pub use repository::GitRepo;

pub use utils::{ExclusionFilter, is_binary_content, repo_relative_path, synthesize_added_diff};
