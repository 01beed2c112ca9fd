//! Update command - stamp the repository with the installed version.

use super::{discover_repo, TOOL_VERSION};
use anyhow::{Context, Result};
use console::style;

/// Overwrite the repository version marker.
pub fn run() -> Result<()> {
    let repo = discover_repo()?;
    let previous = repo.stored_version()?;

    repo.version_update(TOOL_VERSION)
        .context("Failed to update repository version")?;

    match previous {
        Some(previous) if previous.trim() != TOOL_VERSION => println!(
            "{} Repository updated from {} to {}",
            style("✓").green(),
            previous.trim(),
            style(TOOL_VERSION).cyan()
        ),
        _ => println!(
            "{} Repository at version {}",
            style("✓").green(),
            style(TOOL_VERSION).cyan()
        ),
    }
    Ok(())
}
