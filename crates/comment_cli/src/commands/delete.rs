//! Delete command - tombstone a comment.

use super::{open_repo, refresh_index};
use anyhow::{Context, Result};

/// Delete a comment, leaving a tombstone in its place.
pub fn run(id: &str) -> Result<()> {
    let repo = open_repo()?;

    let old_id = repo.comment_by_id(id)?.id.unwrap_or_else(|| id.to_string());
    let tombstone = repo
        .delete_comment(&old_id)
        .context("Failed to delete comment")?;
    refresh_index(&repo, Some(&old_id), &tombstone);

    println!("Comment deleted");
    Ok(())
}
