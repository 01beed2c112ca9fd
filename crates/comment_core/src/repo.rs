//! Repository handle providing the main comment API.

use crate::comment::Comment;
use crate::commit_range::{resolve_commits, resolve_single_commit};
use crate::error::{CommentError, Result};
use crate::file_ref::FileRef;
use crate::object_store::ObjectStore;
use crate::person::Person;
use crate::refs::Refs;
use crate::TimeProvider;
use chrono::{DateTime, FixedOffset, Local};
use git2::{Oid, Repository};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Maximum number of live comments on a single commit.
pub const MAX_COMMENTS_PER_COMMIT: usize = 4096;

/// Comment repository handle.
///
/// Wraps a git repository and stores comments as blobs named by
/// `refs/comments/` references.
pub struct CommentRepo {
    repo: Repository,
    /// Time provider for testing (None = use system time).
    time_provider: Option<Arc<dyn TimeProvider>>,
}

impl CommentRepo {
    /// Opens the git repository containing `path`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use comment_core::CommentRepo;
    ///
    /// let repo = CommentRepo::open(".").unwrap();
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let repo = Repository::discover(path.as_ref())?;
        Ok(Self::from_repository(repo))
    }

    /// Wraps an already opened git repository.
    pub fn from_repository(repo: Repository) -> Self {
        Self {
            repo,
            time_provider: None,
        }
    }

    /// Sets a custom clock, used for every create/amend timestamp.
    pub fn with_time_provider(mut self, provider: impl TimeProvider + 'static) -> Self {
        self.time_provider = Some(Arc::new(provider));
        self
    }

    /// The underlying git repository.
    pub fn git(&self) -> &Repository {
        &self.repo
    }

    /// Directory for tool-local state (`<git-dir>/comments`).
    pub fn comments_dir(&self) -> PathBuf {
        self.repo.path().join("comments")
    }

    pub(crate) fn objects(&self) -> ObjectStore<'_> {
        ObjectStore::new(&self.repo)
    }

    pub(crate) fn refs(&self) -> Refs<'_> {
        Refs::new(&self.repo)
    }

    pub(crate) fn now(&self) -> DateTime<FixedOffset> {
        match &self.time_provider {
            Some(provider) => provider.now(),
            None => Local::now().fixed_offset(),
        }
    }

    /// Resolves the acting person from an override or the git identity.
    ///
    /// The person's date is always the current time.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPerson` for a malformed override and
    /// `NoAuthorConfigured` when no identity is available.
    pub fn resolve_person(&self, override_person: Option<&str>) -> Result<Person> {
        let now = self.now();
        let mut person = match override_person.map(str::trim).filter(|p| !p.is_empty()) {
            Some(text) => Person::parse(text)?,
            None => self
                .repo
                .signature()
                .ok()
                .and_then(|sig| Person::from_signature(&sig))
                .ok_or(CommentError::NoAuthorConfigured)?,
        };
        person.date = now;
        Ok(person)
    }

    /// Creates a comment on a commit and returns its id.
    ///
    /// An empty `commitish` means `HEAD`.
    ///
    /// # Errors
    ///
    /// Returns `MaxCommentsExceeded` once the commit carries
    /// [`MAX_COMMENTS_PER_COMMIT`] comments.
    pub fn create_comment(
        &self,
        commitish: &str,
        author: Option<&str>,
        message: &str,
        file_ref: Option<FileRef>,
    ) -> Result<String> {
        let commit = resolve_single_commit(&self.repo, commitish)?;
        check_capacity(self.comment_count_on_commit(&commit)?, &commit)?;

        let author = self.resolve_person(author)?;
        let now = author.date;
        let comment = Comment::new(message, &commit, file_ref, author, now)?;

        let id = self.objects().put_comment(&comment)?;
        self.refs().create_comment_ref(&commit, id)?;
        debug!(commit = %commit, comment = %id, "created comment");
        Ok(id.to_string())
    }

    /// Replaces a comment's content and returns the new id.
    ///
    /// # Errors
    ///
    /// Returns `CommentNotFound` if `id` does not name a live comment,
    /// tombstones included.
    pub fn update_comment(&self, id: &str, amender: Option<&str>, message: &str) -> Result<String> {
        if message.is_empty() {
            return Err(CommentError::EmptyMessage);
        }
        let mut comment = self.comment_by_id(id)?;
        if comment.deleted {
            return Err(CommentError::CommentNotFound(
                comment.id.unwrap_or_else(|| id.to_string()),
            ));
        }
        let amender = self.resolve_person(amender)?;
        let now = amender.date;
        comment.amend(message, amender, now);
        self.replace_comment(&comment)
    }

    /// Tombstones a comment and returns the tombstone's id.
    ///
    /// Without a git identity the previous amender is kept and only the
    /// amend time moves.
    pub fn delete_comment(&self, id: &str) -> Result<String> {
        let mut comment = self.comment_by_id(id)?;
        let amender = match self.resolve_person(None) {
            Ok(person) => person,
            Err(CommentError::NoAuthorConfigured) => {
                let mut person = comment.amender.clone();
                person.date = self.now();
                person
            }
            Err(e) => return Err(e),
        };
        let now = amender.date;
        comment.mark_deleted(amender, now);
        self.replace_comment(&comment)
    }

    /// Re-persists an edited comment under a new id.
    ///
    /// Order: write the new blob, delete the old ref, create the new ref.
    /// Both refs are never live at once. If the new ref cannot be created the
    /// old ref is restored and the original error returned; only a failed
    /// restore surfaces as `DanglingComment`.
    fn replace_comment(&self, comment: &Comment) -> Result<String> {
        let old_id = comment
            .id
            .clone()
            .ok_or_else(|| CommentError::CommentNotFound(String::new()))?;

        let new_id = self.objects().put_comment(comment)?;

        let refs = self.refs();
        refs.delete_comment_ref(&comment.commit, &old_id)
            .map_err(|e| match e {
                CommentError::RefNotFound(_) => CommentError::CommentNotFound(old_id.clone()),
                other => other,
            })?;

        if let Err(e) = refs.create_comment_ref(&comment.commit, new_id) {
            warn!(old = %old_id, new = %new_id, error = %e, "comment ref swap failed, restoring");
            let restored = Oid::from_str(&old_id)
                .map_err(CommentError::from)
                .and_then(|old| refs.create_comment_ref(&comment.commit, old));
            return match restored {
                Ok(_) => Err(e),
                Err(restore) => Err(CommentError::DanglingComment {
                    old_id,
                    new_id: new_id.to_string(),
                    reason: format!("{}; restore failed: {}", e, restore),
                }),
            };
        }

        debug!(old = %old_id, new = %new_id, "replaced comment");
        Ok(new_id.to_string())
    }

    /// Loads a comment by full or abbreviated id.
    pub fn comment_by_id(&self, id: &str) -> Result<Comment> {
        self.objects().get_comment(id)
    }

    /// Loads every comment on one commit, in reference order.
    ///
    /// Blobs that fail to deserialize are skipped.
    pub fn comments_on_commit(&self, commit: &str) -> Result<Vec<Comment>> {
        let objects = self.objects();
        let mut comments = Vec::new();
        for comment_ref in self.refs().list_commit_refs(commit)? {
            match objects.get_comment(&comment_ref.id.to_string()) {
                Ok(comment) => comments.push(comment),
                Err(e) => warn!(reference = %comment_ref.name, error = %e, "skipping unreadable comment"),
            }
        }
        Ok(comments)
    }

    /// Loads comments on several commits, stably sorted by creation time.
    pub fn comments_on_commits(&self, commits: &[Oid]) -> Result<Vec<Comment>> {
        let mut comments = Vec::new();
        for commit in commits {
            comments.extend(self.comments_on_commit(&commit.to_string())?);
        }
        comments.sort_by_key(|c| c.create_time);
        Ok(comments)
    }

    /// Loads comments on every commit of a range or on a single commit.
    pub fn comments_on_commitish(&self, commitish: &str) -> Result<Vec<Comment>> {
        let range = resolve_commits(&self.repo, commitish)?;
        let commits = range.commits(&self.repo)?;
        self.comments_on_commits(&commits)
    }

    /// Counts live comment references on a commit.
    pub fn comment_count_on_commit(&self, commit: &str) -> Result<usize> {
        self.refs().count_commit_refs(commit)
    }

    /// Loads every comment in the repository, tombstones included.
    pub fn all_comments(&self) -> Result<Vec<Comment>> {
        let objects = self.objects();
        let mut comments = Vec::new();
        for comment_ref in self.refs().list_all_refs()? {
            match objects.get_comment(&comment_ref.id.to_string()) {
                Ok(comment) => comments.push(comment),
                Err(e) => warn!(reference = %comment_ref.name, error = %e, "skipping unreadable comment"),
            }
        }
        Ok(comments)
    }
}

/// Fails once a commit already holds the maximum number of comments.
pub fn check_capacity(count: usize, commit: &str) -> Result<()> {
    if count >= MAX_COMMENTS_PER_COMMIT {
        return Err(CommentError::MaxCommentsExceeded {
            commit: commit.to_string(),
            limit: MAX_COMMENTS_PER_COMMIT,
        });
    }
    Ok(())
}
