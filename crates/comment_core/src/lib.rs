//! Comment Core Library
//!
//! Stores review comments on git commits inside the repository itself:
//! - Comments are git blobs in a simple header/body text format
//! - Each live comment is named by `refs/comments/<commit>/<comment>`
//! - Comments attach to a file, a line and a side of the diff
//! - Annotated diffs render comments inline with their context
//!
//! # Quick Start
//!
//! ```
//! use comment_core::{CommentRepo, FileRef, LineType};
//! use git2::{Repository, Signature};
//! use tempfile::TempDir;
//!
//! let tmp = TempDir::new().unwrap();
//! let git = Repository::init(tmp.path()).unwrap();
//! {
//!     let sig = Signature::now("Sam", "sam@example.com").unwrap();
//!     let tree = git.treebuilder(None).unwrap().write().unwrap();
//!     let tree = git.find_tree(tree).unwrap();
//!     git.commit(Some("HEAD"), &sig, &sig, "root", &tree, &[]).unwrap();
//! }
//!
//! let repo = CommentRepo::from_repository(git);
//! let file = FileRef::new("src/main.rs", 12, LineType::New);
//! let id = repo
//!     .create_comment("HEAD", Some("Sam <sam@example.com>"), "Looks good", Some(file))
//!     .unwrap();
//!
//! let comment = repo.comment_by_id(&id).unwrap();
//! assert_eq!(comment.content, "Looks good");
//! ```
//!
//! # Versioning
//!
//! The repository records the version of the tool that last wrote it
//! under `refs/comments/version`:
//!
//! ```
//! use comment_core::{compare_version, VersionStatus};
//!
//! assert_eq!(compare_version("1.0.0", "1.0.0").unwrap(), VersionStatus::Equal);
//! assert_eq!(compare_version("0.9.0", "1.0.0").unwrap(), VersionStatus::UpgradeTool);
//! ```

mod comment;
mod commit_range;
mod config;
mod diff;
mod error;
mod file_ref;
mod format;
mod object_store;
mod person;
mod printer;
mod property_blob;
mod refs;
mod repo;
mod search;
mod version;

pub use comment::{short_hash, Comment};
pub use commit_range::{resolve_commits, resolve_single_commit, CommitRange};
pub use config::{first_configured, Config, EditorConfig, LogConfig, SearchConfig};
pub use diff::{associate, Diff, DiffFile, DiffLine, DiffLineType, UNASSIGNED_COMMENTS_FILE};
pub use error::{CommentError, Result};
pub use file_ref::{FileRef, LineType};
pub use format::{FormatConfig, Formatter, PrettyFormat};
pub use object_store::{ObjectStore, MAX_BLOB_SIZE};
pub use person::{format_timestamp, parse_timestamp, Person};
pub use printer::{DiffPrinter, Renderer};
pub use property_blob::PropertyBlob;
pub use refs::{
    commit_ref_dir, parse_comment_ref, ref_path, CommentRef, Refs, COMMENTS_REF_PREFIX,
    VERSION_REF,
};
pub use repo::{check_capacity, CommentRepo, MAX_COMMENTS_PER_COMMIT};
pub use search::{tokenize, CommentIndex, SearchIndex, SEARCH_SCHEMA_VERSION};
pub use version::{compare_version, VersionStatus};

use chrono::{DateTime, FixedOffset};

/// Time provider trait for testing.
///
/// Supplies the timestamp stamped on created and amended comments. Only used
/// when explicitly set via `CommentRepo::with_time_provider()`.
pub trait TimeProvider: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<FixedOffset>;
}

impl<F> TimeProvider for F
where
    F: Fn() -> DateTime<FixedOffset> + Send + Sync,
{
    fn now(&self) -> DateTime<FixedOffset> {
        self()
    }
}
