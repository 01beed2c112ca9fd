//! CLI commands.

use anyhow::{Context, Result};
use comment_core::CommentRepo;

pub mod add;
pub mod amend;
pub mod delete;
pub mod list;
pub mod log;
pub mod search;
pub mod update;

/// Version written to and checked against `refs/comments/version`.
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Opens the repository around the working directory without the version
/// gate.
pub fn discover_repo() -> Result<CommentRepo> {
    CommentRepo::open(".").context("Not a git repository (or any of the parent directories)")
}

/// Opens the repository and checks it against the installed version.
pub fn open_repo() -> Result<CommentRepo> {
    let repo = discover_repo()?;
    repo.version_check(TOOL_VERSION)?;
    Ok(repo)
}

/// Keeps an existing search index in step with a changed comment.
///
/// The comment itself is already stored, so failures only warn.
pub fn refresh_index(repo: &CommentRepo, old_id: Option<&str>, new_id: &str) {
    if let Err(e) = repo.refresh_search_index(old_id, new_id) {
        tracing::warn!(error = %e, "search index not updated, run 'git-comment index'");
    }
}
