//! Comment entity and its property-blob encoding.

use crate::error::{CommentError, Result};
use crate::file_ref::FileRef;
use crate::person::{format_timestamp, parse_timestamp, Person};
use crate::property_blob::PropertyBlob;
use chrono::{DateTime, FixedOffset};

const COMMIT_KEY: &str = "commit";
const FILE_REF_KEY: &str = "file";
const AUTHOR_KEY: &str = "author";
const CREATED_KEY: &str = "created";
const AMENDER_KEY: &str = "amender";
const AMENDED_KEY: &str = "amended";
const DELETED_KEY: &str = "deleted";

/// A comment attached to a commit, optionally pinned to a file and line.
///
/// Stored as a git blob:
///
/// ```text
/// commit 0155eb4229851634a0f03eb265b69f5a2d56f341
/// file src/example.txt:12
/// author Delisa Mason <name@example.com> 1243040974 -0900
/// created 1243040974 -0900
/// amender Delisa Mason <name@example.com> 1243040974 -0900
/// amended 1243040974 -0900
///
/// Too many levels of indentation here.
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Original author.
    pub author: Person,
    /// When the comment was first written.
    pub create_time: DateTime<FixedOffset>,
    /// Comment text. The first line is the title.
    pub content: String,
    /// Last person to amend the comment.
    pub amender: Person,
    /// When the comment was last amended.
    pub amend_time: DateTime<FixedOffset>,
    /// Full hash of the commented commit.
    pub commit: String,
    /// Blob id, set once persisted.
    pub id: Option<String>,
    /// Tombstone marker.
    pub deleted: bool,
    /// Location inside the commit, if any.
    pub file_ref: Option<FileRef>,
}

impl Comment {
    /// Creates an unsaved comment authored at `now`.
    ///
    /// # Errors
    ///
    /// Returns `EmptyMessage` for empty content and `InvalidHash` for an
    /// empty commit.
    pub fn new(
        message: &str,
        commit: &str,
        file_ref: Option<FileRef>,
        author: Person,
        now: DateTime<FixedOffset>,
    ) -> Result<Self> {
        if message.is_empty() {
            return Err(CommentError::EmptyMessage);
        }
        if commit.is_empty() {
            return Err(CommentError::InvalidHash(commit.to_string()));
        }
        Ok(Self {
            amender: author.clone(),
            author,
            create_time: now,
            content: message.to_string(),
            amend_time: now,
            commit: commit.to_string(),
            id: None,
            deleted: false,
            file_ref,
        })
    }

    /// First line of the content.
    pub fn title(&self) -> &str {
        self.content.lines().next().unwrap_or_default()
    }

    /// Replaces the content and records the amender.
    pub fn amend(&mut self, message: &str, amender: Person, now: DateTime<FixedOffset>) {
        self.content = message.to_string();
        self.amender = amender;
        self.amend_time = now;
    }

    /// Marks the comment as a tombstone.
    pub fn mark_deleted(&mut self, amender: Person, now: DateTime<FixedOffset>) {
        self.deleted = true;
        self.amender = amender;
        self.amend_time = now;
    }

    /// Renders the blob text. Tombstones carry no body.
    pub fn serialize(&self) -> String {
        let mut blob = PropertyBlob::new();
        blob.set(COMMIT_KEY, self.commit.as_str());
        if let Some(file_ref) = &self.file_ref {
            blob.set(FILE_REF_KEY, file_ref.to_string());
        }
        blob.set(AUTHOR_KEY, self.author.to_string());
        blob.set(CREATED_KEY, format_timestamp(&self.create_time));
        blob.set(AMENDER_KEY, self.amender.to_string());
        blob.set(AMENDED_KEY, format_timestamp(&self.amend_time));
        if self.deleted {
            blob.set(DELETED_KEY, "true");
        } else {
            blob.message = self.content.clone();
        }
        blob.serialize()
    }

    /// Parses blob text. The returned comment has no id.
    ///
    /// # Errors
    ///
    /// Returns `Deserialization` when the commit, either timestamp or either
    /// person is missing or malformed.
    pub fn deserialize(content: &str) -> Result<Self> {
        let blob = PropertyBlob::parse(content);

        let commit = blob
            .get(COMMIT_KEY)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| missing(COMMIT_KEY))?;
        let author = person_field(&blob, AUTHOR_KEY)?;
        let amender = person_field(&blob, AMENDER_KEY)?;
        let create_time = time_field(&blob, CREATED_KEY)?;
        let amend_time = time_field(&blob, AMENDED_KEY)?;
        let file_ref = blob
            .get(FILE_REF_KEY)
            .filter(|f| !f.is_empty())
            .map(FileRef::parse);
        let deleted = blob.get(DELETED_KEY) == Some("true");

        Ok(Self {
            author,
            create_time,
            content: if deleted {
                String::new()
            } else {
                blob.message.clone()
            },
            amender,
            amend_time,
            commit: commit.to_string(),
            id: None,
            deleted,
            file_ref,
        })
    }
}

/// First seven characters of a hash.
pub fn short_hash(hash: &str) -> &str {
    hash.get(..7).unwrap_or(hash)
}

fn missing(key: &str) -> CommentError {
    CommentError::Deserialization(format!("missing or empty '{}'", key))
}

fn person_field(blob: &PropertyBlob, key: &str) -> Result<Person> {
    let value = blob.get(key).ok_or_else(|| missing(key))?;
    Person::parse(value)
        .map_err(|_| CommentError::Deserialization(format!("invalid '{}': {:?}", key, value)))
}

fn time_field(blob: &PropertyBlob, key: &str) -> Result<DateTime<FixedOffset>> {
    let value = blob.get(key).ok_or_else(|| missing(key))?;
    parse_timestamp(value)
        .ok_or_else(|| CommentError::Deserialization(format!("invalid '{}': {:?}", key, value)))
}
