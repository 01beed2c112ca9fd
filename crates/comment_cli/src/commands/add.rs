//! Add command - create a comment.

use super::{open_repo, refresh_index};
use crate::editor::message_from_editor;
use anyhow::{Context, Result};
use comment_core::{short_hash, FileRef};

/// Create a comment on a commit, optionally pinned to a file and line.
pub fn run(
    file_ref: Option<&str>,
    message: Option<String>,
    commit: Option<&str>,
    author: Option<&str>,
    mark_deleted_line: bool,
) -> Result<()> {
    let repo = open_repo()?;

    let message = match message.filter(|m| !m.is_empty()) {
        Some(message) => message,
        None => message_from_editor(&repo)?,
    };
    let file_ref = file_ref
        .filter(|f| !f.is_empty())
        .map(|f| FileRef::parse_marked(f, mark_deleted_line));

    let id = repo
        .create_comment(commit.unwrap_or_default(), author, &message, file_ref)
        .context("Failed to create comment")?;
    refresh_index(&repo, None, &id);

    println!("[{}] Comment created", short_hash(&id));
    Ok(())
}
