//! Amend command - replace a comment's content.

use super::{open_repo, refresh_index};
use crate::editor::message_from_editor;
use anyhow::{Context, Result};
use comment_core::short_hash;

/// Replace the content of an existing comment.
pub fn run(id: &str, message: Option<String>, author: Option<&str>) -> Result<()> {
    let repo = open_repo()?;

    // Resolve first so an abbreviated id can be removed from the index.
    let old_id = repo.comment_by_id(id)?.id.unwrap_or_else(|| id.to_string());

    let message = match message.filter(|m| !m.is_empty()) {
        Some(message) => message,
        None => message_from_editor(&repo)?,
    };

    let new_id = repo
        .update_comment(&old_id, author, &message)
        .context("Failed to amend comment")?;
    refresh_index(&repo, Some(&old_id), &new_id);

    println!("[{}] Comment updated", short_hash(&new_id));
    Ok(())
}
