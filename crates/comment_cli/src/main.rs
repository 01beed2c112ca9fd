//! git-comment - review comments stored inside a git repository.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use comment_core::CommentError;
use console::style;
use std::process::ExitCode;

mod commands;
mod editor;
mod pager;

#[derive(Parser)]
#[command(name = "git-comment")]
#[command(about = "Add comments to commits and diffs within git repositories", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Comment on a commit, a file or a line
    Add {
        /// File and line to annotate (file[:line[:old]])
        file_ref: Option<String>,
        /// Comment content (opens the editor when omitted)
        #[arg(short, long)]
        message: Option<String>,
        /// Commit to annotate (defaults to HEAD)
        #[arg(short, long)]
        commit: Option<String>,
        /// Override the comment author ("Name <email>")
        #[arg(long)]
        author: Option<String>,
        /// Attach to the deleted version of the line
        #[arg(long)]
        mark_deleted_line: bool,
    },
    /// Replace the content of a comment
    Amend {
        /// Comment ID (full or abbreviated)
        id: String,
        /// New content (opens the editor when omitted)
        #[arg(short, long)]
        message: Option<String>,
        /// Override the amender ("Name <email>")
        #[arg(long)]
        author: Option<String>,
    },
    /// Delete a comment
    Delete {
        /// Comment ID (full or abbreviated)
        id: String,
    },
    /// List comments on a commit or range
    List {
        /// Revision or range (defaults to HEAD)
        revision: Option<String>,
        /// Comment format: short, full, raw, disco or format:<template>
        #[arg(long)]
        pretty: Option<String>,
    },
    /// Show comments inline with the diff
    Log(LogArgs),
    /// Look for comments containing text
    Find {
        /// Search text
        text: String,
        /// Disable the pager
        #[arg(long)]
        no_pager: bool,
        /// Disable color
        #[arg(long)]
        no_color: bool,
    },
    /// Index comment content for searching
    Index,
    /// Upgrade the repository to this version of git-comment
    Update,
}

/// Options for `git-comment log`.
#[derive(Args)]
pub struct LogArgs {
    /// Revision or range (defaults to HEAD)
    pub revision: Option<String>,
    /// Show the full diff surrounding the comments
    #[arg(long)]
    pub full_diff: bool,
    /// Comment format: short, full, raw, disco or format:<template>
    #[arg(long)]
    pub pretty: Option<String>,
    /// Disable the pager
    #[arg(long)]
    pub no_pager: bool,
    /// Disable color
    #[arg(long)]
    pub no_color: bool,
    /// Hide the margin line beside comments
    #[arg(long)]
    pub no_margin_line: bool,
    /// Show line numbers
    #[arg(long)]
    pub line_numbers: bool,
    /// Context lines to show before comments
    #[arg(short = 'B', long)]
    pub lines_before: Option<u32>,
    /// Context lines to show after comments
    #[arg(short = 'A', long)]
    pub lines_after: Option<u32>,
}

fn main() -> ExitCode {
    // Initialize tracing subscriber
    // Respects RUST_LOG environment variable (e.g., RUST_LOG=debug)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Add {
            file_ref,
            message,
            commit,
            author,
            mark_deleted_line,
        } => commands::add::run(
            file_ref.as_deref(),
            message,
            commit.as_deref(),
            author.as_deref(),
            mark_deleted_line,
        ),
        Commands::Amend { id, message, author } => {
            commands::amend::run(&id, message, author.as_deref())
        }
        Commands::Delete { id } => commands::delete::run(&id),
        Commands::List { revision, pretty } => {
            commands::list::run(revision.as_deref(), pretty.as_deref())
        }
        Commands::Log(args) => commands::log::run(&args),
        Commands::Find {
            text,
            no_pager,
            no_color,
        } => commands::search::find(&text, no_pager, no_color),
        Commands::Index => commands::search::index(),
        Commands::Update => commands::update::run(),
    }
}

fn report(error: &anyhow::Error) {
    eprintln!("{} {}", style("error:").red().bold(), error);
    for cause in error.chain().skip(1) {
        eprintln!("  caused by: {}", cause);
    }
    let hint = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<CommentError>())
        .and_then(CommentError::recovery_suggestion);
    if let Some(hint) = hint {
        eprintln!("{} {}", style("hint:").yellow(), hint);
    }
}
