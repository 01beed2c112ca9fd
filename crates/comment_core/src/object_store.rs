//! Comment blobs in the git object database.

use crate::comment::Comment;
use crate::error::{CommentError, Result};
use git2::{ErrorCode, ObjectType, Oid, Repository};

/// Maximum size for a single comment blob (1 MiB).
pub const MAX_BLOB_SIZE: usize = 1024 * 1024;

/// Content-addressed storage of comment blobs.
///
/// Ids are git blob hashes, so identical content always yields the same id
/// and any amendment yields a new one.
pub struct ObjectStore<'repo> {
    repo: &'repo Repository,
}

impl<'repo> ObjectStore<'repo> {
    /// Wraps a repository's object database.
    pub fn new(repo: &'repo Repository) -> Self {
        Self { repo }
    }

    /// Stores raw bytes and returns their blob id.
    ///
    /// # Errors
    ///
    /// Returns `BlobTooLarge` above the size limit.
    pub fn put_blob(&self, data: &[u8]) -> Result<Oid> {
        if data.len() > MAX_BLOB_SIZE {
            return Err(CommentError::BlobTooLarge {
                size: data.len(),
                limit: MAX_BLOB_SIZE,
            });
        }
        Ok(self.repo.blob(data)?)
    }

    /// Resolves a full or abbreviated id to a stored blob.
    ///
    /// # Errors
    ///
    /// Returns `CommentNotFound` if no blob matches.
    pub fn resolve_blob(&self, id: &str) -> Result<Oid> {
        let not_found = || CommentError::CommentNotFound(id.to_string());
        if id.is_empty() || !id.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(not_found());
        }
        let object = self.repo.revparse_single(id).map_err(|e| match e.code() {
            ErrorCode::NotFound | ErrorCode::Ambiguous | ErrorCode::InvalidSpec => not_found(),
            _ => CommentError::Git(e),
        })?;
        if object.kind() != Some(ObjectType::Blob) {
            return Err(not_found());
        }
        Ok(object.id())
    }

    /// Reads blob content.
    pub fn get_blob(&self, id: Oid) -> Result<Vec<u8>> {
        let blob = self.repo.find_blob(id).map_err(|e| match e.code() {
            ErrorCode::NotFound => CommentError::CommentNotFound(id.to_string()),
            _ => CommentError::Git(e),
        })?;
        Ok(blob.content().to_vec())
    }

    /// Serializes and stores a comment, returning the new blob id.
    pub fn put_comment(&self, comment: &Comment) -> Result<Oid> {
        self.put_blob(comment.serialize().as_bytes())
    }

    /// Loads and deserializes a comment, setting its id.
    ///
    /// # Errors
    ///
    /// Returns `CommentNotFound` for unknown ids and `Deserialization` for
    /// blobs that are not comments.
    pub fn get_comment(&self, id: &str) -> Result<Comment> {
        let oid = self.resolve_blob(id)?;
        let data = self.get_blob(oid)?;
        let text = String::from_utf8(data)
            .map_err(|e| CommentError::Deserialization(format!("blob {} is not UTF-8: {}", oid, e)))?;
        let mut comment = Comment::deserialize(&text)?;
        comment.id = Some(oid.to_string());
        Ok(comment)
    }
}
