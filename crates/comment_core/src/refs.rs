//! The `refs/comments/` reference namespace.
//!
//! Each comment is named by `refs/comments/<commit[..4]>/<commit[4..]>/<id>`,
//! sharding the namespace by commit hash. The tool version marker lives at
//! `refs/comments/version`.

use crate::comment::short_hash;
use crate::error::{CommentError, Result};
use git2::{ErrorCode, Oid, Repository};
use tracing::{debug, warn};

/// Root of the comment namespace.
pub const COMMENTS_REF_PREFIX: &str = "refs/comments";

/// Reference holding the repository's tool version blob.
pub const VERSION_REF: &str = "refs/comments/version";

const SHARD_LEN: usize = 4;

/// Builds the reference name for a comment on a commit.
///
/// # Errors
///
/// Returns `InvalidHash` if `commit` has 4 or fewer characters.
///
/// # Examples
///
/// ```
/// use comment_core::ref_path;
///
/// let path = ref_path("0155eb4229851634a0f03eb265b69f5a2d56f341", "abc123").unwrap();
/// assert_eq!(path, "refs/comments/0155/eb4229851634a0f03eb265b69f5a2d56f341/abc123");
/// ```
pub fn ref_path(commit: &str, id: &str) -> Result<String> {
    Ok(format!("{}/{}", commit_ref_dir(commit)?, id))
}

/// Builds the reference directory holding every comment on a commit.
pub fn commit_ref_dir(commit: &str) -> Result<String> {
    if commit.len() <= SHARD_LEN || !commit.is_ascii() {
        return Err(CommentError::InvalidHash(commit.to_string()));
    }
    let (shard, rest) = commit.split_at(SHARD_LEN);
    Ok(format!("{}/{}/{}", COMMENTS_REF_PREFIX, shard, rest))
}

/// Splits a comment reference name into `(commit, id)`.
///
/// Returns `None` for names outside the sharded layout, including the
/// version marker.
pub fn parse_comment_ref(name: &str) -> Option<(String, String)> {
    let rest = name.strip_prefix(COMMENTS_REF_PREFIX)?.strip_prefix('/')?;
    let mut parts = rest.split('/');
    let shard = parts.next()?;
    let tail = parts.next()?;
    let id = parts.next()?;
    if parts.next().is_some() || shard.len() != SHARD_LEN || tail.is_empty() || id.is_empty() {
        return None;
    }
    Some((format!("{}{}", shard, tail), id.to_string()))
}

/// A comment reference found during enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentRef {
    /// Full reference name.
    pub name: String,
    /// Commented commit hash.
    pub commit: String,
    /// Blob id the reference points at.
    pub id: Oid,
}

/// Manages comment references in a git repository.
///
/// Reference updates rely on git for atomicity; no extra locking is done.
pub struct Refs<'repo> {
    repo: &'repo Repository,
}

impl<'repo> Refs<'repo> {
    /// Wraps a repository's reference database.
    pub fn new(repo: &'repo Repository) -> Self {
        Self { repo }
    }

    /// Creates the reference for a new comment blob.
    ///
    /// Never overwrites an existing reference.
    pub fn create_comment_ref(&self, commit: &str, id: Oid) -> Result<String> {
        let name = ref_path(commit, &id.to_string())?;
        let id_str = id.to_string();
        let message = format!(
            "Created a comment ref on [{}] to [{}]",
            short_hash(commit),
            short_hash(&id_str)
        );
        self.repo.reference(&name, id, false, &message)?;
        debug!(reference = %name, "created comment ref");
        Ok(name)
    }

    /// Deletes the reference for a comment.
    ///
    /// # Errors
    ///
    /// Returns `RefNotFound` if no such reference exists.
    pub fn delete_comment_ref(&self, commit: &str, id: &str) -> Result<()> {
        let name = ref_path(commit, id)?;
        let mut reference = self.repo.find_reference(&name).map_err(|e| match e.code() {
            ErrorCode::NotFound => CommentError::RefNotFound(name.clone()),
            _ => CommentError::Git(e),
        })?;
        reference.delete()?;
        debug!(reference = %name, "deleted comment ref");
        Ok(())
    }

    /// Lists comment references on a single commit, sorted by name.
    pub fn list_commit_refs(&self, commit: &str) -> Result<Vec<CommentRef>> {
        let glob = format!("{}/*", commit_ref_dir(commit)?);
        self.collect(&glob)
    }

    /// Lists every comment reference in the repository, sorted by name.
    pub fn list_all_refs(&self) -> Result<Vec<CommentRef>> {
        let glob = format!("{}/*", COMMENTS_REF_PREFIX);
        self.collect(&glob)
    }

    /// Counts comment references on a commit.
    pub fn count_commit_refs(&self, commit: &str) -> Result<usize> {
        Ok(self.list_commit_refs(commit)?.len())
    }

    /// Reads the blob id of the version marker, if present.
    pub fn read_version_ref(&self) -> Result<Option<Oid>> {
        match self.repo.find_reference(VERSION_REF) {
            Ok(reference) => Ok(reference.target()),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Points the version marker at a blob, replacing any previous value.
    pub fn write_version_ref(&self, id: Oid) -> Result<()> {
        self.repo
            .reference(VERSION_REF, id, true, "Updated git-comment version")?;
        debug!(blob = %id, "wrote version marker");
        Ok(())
    }

    fn collect(&self, glob: &str) -> Result<Vec<CommentRef>> {
        let mut refs = Vec::new();
        for reference in self.repo.references_glob(glob)? {
            let reference = reference?;
            let Some(name) = reference.name() else {
                warn!("skipping comment ref with non UTF-8 name");
                continue;
            };
            let Some((commit, _)) = parse_comment_ref(name) else {
                if name != VERSION_REF {
                    warn!(reference = name, "skipping malformed comment ref");
                }
                continue;
            };
            let Some(id) = reference.target() else {
                warn!(reference = name, "skipping symbolic comment ref");
                continue;
            };
            refs.push(CommentRef {
                name: name.to_string(),
                commit,
                id,
            });
        }
        refs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(refs)
    }
}
