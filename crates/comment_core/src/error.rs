//! Error types for comment_core operations.

use thiserror::Error;

/// Core error type for comment storage, diffing and versioning.
#[derive(Error, Debug)]
pub enum CommentError {
    /// A person string could not be parsed as `Name <email> [seconds offset]`.
    #[error("person could not be created from input: {0:?}")]
    InvalidPerson(String),

    /// A comment was created or amended without content.
    #[error("no message content provided")]
    EmptyMessage,

    /// The commit hash is too short to be sharded into a ref path.
    #[error("invalid commit hash for storage: {0:?}")]
    InvalidHash(String),

    /// No comment blob exists for the given id.
    #[error("comment not found: {0}")]
    CommentNotFound(String),

    /// The commit-ish did not resolve to a commit.
    #[error("no commit found for {0:?}")]
    CommitNotFound(String),

    /// Reference not found.
    #[error("ref not found: {0}")]
    RefNotFound(String),

    /// A single commit was resolved but it has no parent to compare against.
    #[error("no parent commit to compare with {0}")]
    NoParent(String),

    /// The commit already carries the maximum number of comment refs.
    #[error("maximum comments on [{commit}] reached ({limit})")]
    MaxCommentsExceeded {
        /// Full hash of the commit
        commit: String,
        /// The per-commit limit
        limit: usize,
    },

    /// Neither an explicit author nor a configured git identity is available.
    #[error("no name or email found in git config for commenting")]
    NoAuthorConfigured,

    /// A stored blob could not be turned back into a comment.
    #[error("could not deserialize object into comment: {0}")]
    Deserialization(String),

    /// Comment blob exceeds maximum allowed size.
    #[error("comment too large: {size} bytes exceeds limit of {limit} bytes")]
    BlobTooLarge {
        /// Actual size of the blob
        size: usize,
        /// Maximum allowed size
        limit: usize,
    },

    /// The old reference was removed but the replacement could not be created.
    #[error("comment {old_id} was removed but its replacement {new_id} could not be referenced: {reason}")]
    DanglingComment {
        /// Id whose reference was deleted
        old_id: String,
        /// Id of the already written replacement blob
        new_id: String,
        /// Underlying failure
        reason: String,
    },

    /// Either the stored or the running version is not a semantic version.
    #[error("git-comment version corrupted. Please file a bug report.\ntool: {tool}\nrepo: {repo}")]
    VersionCorrupted {
        /// Version string of the running tool
        tool: String,
        /// Version string stored in the repository
        repo: String,
    },

    /// The repository was written by a newer tool.
    #[error("the version of git-comment used in this repository ({repo}) is newer than the version installed ({tool}). Please upgrade.")]
    UpgradeTool {
        /// Version string of the running tool
        tool: String,
        /// Version string stored in the repository
        repo: String,
    },

    /// The repository marker is older than the running tool.
    #[error("the version of git-comment used in this repository ({repo}) is out of date ({tool} installed). Please upgrade by running `git-comment update`")]
    UpgradeRepo {
        /// Version string of the running tool
        tool: String,
        /// Version string stored in the repository
        repo: String,
    },

    /// Configuration error (loading, parsing, invalid values).
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Search index is corrupted and needs rebuilding.
    #[error("index corrupted: {message}. Run 'git-comment index' to repair.")]
    IndexCorrupted {
        /// Description of the corruption
        message: String,
    },

    /// Search index error.
    #[error("search index error: {0}")]
    SearchError(String),

    /// Error reported by libgit2.
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CommentError {
    /// Returns a user-friendly recovery suggestion for the error, if available.
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            Self::NoAuthorConfigured => Some(
                "Set user.name and user.email with 'git config', or pass --author \"Name <email>\".",
            ),
            Self::UpgradeRepo { .. } => Some("Run 'git-comment update' to migrate the repository."),
            Self::UpgradeTool { .. } => Some("Install a newer git-comment release."),
            Self::VersionCorrupted { .. } => Some(
                "Inspect refs/comments/version; 'git-comment update' rewrites it with the installed version.",
            ),
            Self::DanglingComment { .. } => Some(
                "Both comment blobs are still stored. Recreate the ref for the id to keep with 'git update-ref refs/comments/<commit[0..4]>/<commit[4..]>/<id> <id>'.",
            ),
            Self::MaxCommentsExceeded { .. } => {
                Some("Amend or consolidate existing comments on this commit.")
            }
            Self::IndexCorrupted { .. } => Some("Run 'git-comment index' to regenerate the index."),
            Self::CommentNotFound(_) => {
                Some("List comments with 'git-comment list <revision>' to find a valid id.")
            }
            _ => None,
        }
    }
}

/// Convenience Result type for comment_core operations.
pub type Result<T> = std::result::Result<T, CommentError>;
