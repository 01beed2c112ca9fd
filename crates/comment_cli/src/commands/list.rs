//! List command - print the comments on a revision.

use super::open_repo;
use anyhow::{Context, Result};
use comment_core::{FormatConfig, Formatter, PrettyFormat};

/// Print every live comment on a commit or range.
pub fn run(revision: Option<&str>, pretty: Option<&str>) -> Result<()> {
    let repo = open_repo()?;
    let config = repo.config()?;

    let comments = repo
        .comments_on_commitish(revision.unwrap_or_default())
        .context("Failed to load comments")?;

    let formatter = Formatter::new(FormatConfig {
        format: PrettyFormat::parse(pretty.unwrap_or(&config.log.pretty))?,
        margin: false,
        ..FormatConfig::default()
    });

    for comment in comments.iter().filter(|c| !c.deleted) {
        print!("{}", formatter.format_comment(comment));
    }
    Ok(())
}
