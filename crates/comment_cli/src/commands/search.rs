//! Find and index commands - comment search.

use super::open_repo;
use crate::pager::Pager;
use anyhow::{Context, Result};
use comment_core::{FormatConfig, Formatter, Renderer};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};

/// Print comments containing every word of `text`.
pub fn find(text: &str, no_pager: bool, no_color: bool) -> Result<()> {
    let repo = open_repo()?;
    let config = repo.config()?;

    let comments = repo
        .search_comments(text, config.search.max_results)
        .context("Failed to search comments")?;

    let formatter = Formatter::new(FormatConfig {
        color: config.log.color && !no_color,
        ..FormatConfig::default()
    });

    let mut pager = Pager::new(repo.pager_command(), no_pager);
    for comment in &comments {
        pager.write(&formatter.format_search_result(comment, text))?;
    }
    pager.finish()?;
    Ok(())
}

/// Rebuild the search index from every comment in the repository.
pub fn index() -> Result<()> {
    let start = Instant::now();
    let repo = open_repo()?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.set_message("Indexing comments...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = repo.index_comments();
    spinner.finish_and_clear();
    let count = result.context("Failed to index comments")?;

    println!(
        "{} Indexed {} comments in {:.2}s",
        style("✓").green(),
        style(count).cyan(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}
