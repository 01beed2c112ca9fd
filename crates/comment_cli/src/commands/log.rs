//! Log command - comments inline with the diff.

use super::open_repo;
use crate::pager::Pager;
use crate::LogArgs;
use anyhow::{Context, Result};
use comment_core::{DiffPrinter, FormatConfig, Formatter, PrettyFormat};

/// Print the diff of a revision with its comments and surrounding context.
pub fn run(args: &LogArgs) -> Result<()> {
    let repo = open_repo()?;
    let mut config = repo.config()?.log;

    if let Some(before) = args.lines_before.filter(|n| *n > 0) {
        config.lines_before = before;
    }
    if let Some(after) = args.lines_after.filter(|n| *n > 0) {
        config.lines_after = after;
    }

    let diff = repo
        .diff_commits(
            args.revision.as_deref().unwrap_or_default(),
            config.context_lines(),
        )
        .context("Failed to compute diff")?;

    let formatter = Formatter::new(FormatConfig {
        format: PrettyFormat::parse(args.pretty.as_deref().unwrap_or(&config.pretty))?,
        line_numbers: args.line_numbers || config.line_numbers,
        color: config.color && !args.no_color,
        margin: config.margin && !args.no_margin_line,
        term_width: Pager::term_width(),
    });

    let mut pager = Pager::new(repo.pager_command(), args.no_pager);
    DiffPrinter::new(
        &mut pager,
        &formatter,
        config.lines_before as usize,
        config.lines_after as usize,
    )
    .full_diff(args.full_diff)
    .print_diff(&diff)?;
    Ok(())
}
