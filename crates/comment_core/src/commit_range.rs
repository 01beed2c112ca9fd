//! Commit-ish resolution into `(parent, child)` endpoints.

use crate::error::{CommentError, Result};
use git2::{ErrorCode, Oid, Repository, RevparseMode};

const HEAD: &str = "HEAD";

/// A resolved pair of commits. Either side may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitRange {
    /// Older endpoint.
    pub parent: Option<Oid>,
    /// Newer endpoint.
    pub child: Option<Oid>,
}

impl CommitRange {
    /// Walks first parents from `child` back to `parent`, inclusive.
    ///
    /// With only one endpoint set the result is that single commit. The walk
    /// stops at a root commit if `parent` is never reached.
    pub fn commits(&self, repo: &Repository) -> Result<Vec<Oid>> {
        let (parent, child) = match (self.parent, self.child) {
            (Some(parent), Some(child)) => (parent, child),
            (Some(only), None) | (None, Some(only)) => return Ok(vec![only]),
            (None, None) => return Ok(Vec::new()),
        };

        let mut commits = Vec::new();
        let mut current = find_commit(repo, child)?;
        loop {
            commits.push(current.id());
            if current.id() == parent {
                break;
            }
            match current.parent(0) {
                Ok(next) => current = next,
                Err(e) if e.code() == ErrorCode::NotFound => break,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(commits)
    }
}

/// Resolves a commit-ish into a range. Empty input means `HEAD`.
///
/// `a..b` and `a...b` give `{parent: a, child: b}`. A single commit gives
/// `{parent: first parent, child: commit}`.
///
/// # Errors
///
/// Returns `CommitNotFound` if an endpoint is not a commit and `NoParent`
/// for a single root commit.
pub fn resolve_commits(repo: &Repository, commitish: &str) -> Result<CommitRange> {
    let spec = expand(commitish);
    let revspec = repo.revparse(spec).map_err(|e| not_found(spec, e))?;

    if revspec.mode().contains(RevparseMode::SINGLE) {
        let object = revspec
            .from()
            .ok_or_else(|| CommentError::CommitNotFound(spec.to_string()))?;
        let commit = object
            .peel_to_commit()
            .map_err(|_| CommentError::CommitNotFound(spec.to_string()))?;
        let parent = commit
            .parent_id(0)
            .map_err(|_| CommentError::NoParent(commit.id().to_string()))?;
        return Ok(CommitRange {
            parent: Some(parent),
            child: Some(commit.id()),
        });
    }

    let peel = |object: Option<&git2::Object<'_>>| -> Result<Option<Oid>> {
        object
            .map(|o| {
                o.peel_to_commit()
                    .map(|c| c.id())
                    .map_err(|_| CommentError::CommitNotFound(spec.to_string()))
            })
            .transpose()
    };
    Ok(CommitRange {
        parent: peel(revspec.from())?,
        child: peel(revspec.to())?,
    })
}

/// Resolves a commit-ish to the full hash of one commit. Empty input means
/// `HEAD`.
pub fn resolve_single_commit(repo: &Repository, commitish: &str) -> Result<String> {
    let spec = expand(commitish);
    let object = repo.revparse_single(spec).map_err(|e| not_found(spec, e))?;
    let commit = object
        .peel_to_commit()
        .map_err(|_| CommentError::CommitNotFound(spec.to_string()))?;
    Ok(commit.id().to_string())
}

fn expand(commitish: &str) -> &str {
    let trimmed = commitish.trim();
    if trimmed.is_empty() {
        HEAD
    } else {
        trimmed
    }
}

fn find_commit(repo: &Repository, id: Oid) -> Result<git2::Commit<'_>> {
    repo.find_commit(id)
        .map_err(|_| CommentError::CommitNotFound(id.to_string()))
}

fn not_found(spec: &str, e: git2::Error) -> CommentError {
    match e.code() {
        ErrorCode::NotFound | ErrorCode::InvalidSpec | ErrorCode::Ambiguous | ErrorCode::UnbornBranch => {
            CommentError::CommitNotFound(spec.to_string())
        }
        _ => CommentError::Git(e),
    }
}
