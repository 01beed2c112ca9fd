//! Full-text search over comments.
//!
//! An inverted index stored in a redb database at
//! `<git-dir>/comments/index.redb`. The index is derived data: it can be
//! deleted and rebuilt from the comment refs at any time.

use crate::comment::Comment;
use crate::error::{CommentError, Result};
use crate::repo::CommentRepo;
use redb::{Database, ReadableTable, ReadableTableMetadata, TableDefinition, TableError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Index schema version for migration support.
pub const SEARCH_SCHEMA_VERSION: u32 = 1;

const INDEX_FILE: &str = "index.redb";

const METADATA_TABLE: TableDefinition<&str, u32> = TableDefinition::new("metadata");
const DOCUMENTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("documents");
const TERMS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("terms");

/// The searchable projection of a comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentIndex {
    pub id: String,
    pub author: String,
    pub amender: String,
    pub commit: String,
    pub content: String,
    pub file_ref: String,
}

impl CommentIndex {
    /// Projects a persisted comment. Returns `None` for unsaved comments.
    pub fn from_comment(comment: &Comment) -> Option<Self> {
        Some(Self {
            id: comment.id.clone()?,
            author: format!("{} <{}>", comment.author.name, comment.author.email),
            amender: format!("{} <{}>", comment.amender.name, comment.amender.email),
            commit: comment.commit.clone(),
            content: comment.content.clone(),
            file_ref: comment
                .file_ref
                .as_ref()
                .map(|r| r.to_string())
                .unwrap_or_default(),
        })
    }

    fn terms(&self) -> BTreeSet<String> {
        [
            &self.author,
            &self.amender,
            &self.commit,
            &self.content,
            &self.file_ref,
        ]
        .into_iter()
        .flat_map(|field| tokenize(field))
        .collect()
    }
}

/// Splits text into lowercase alphanumeric terms.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Inverted index of comment terms.
pub struct SearchIndex {
    db: Database,
    path: PathBuf,
}

impl SearchIndex {
    /// Opens an existing index. Returns `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `IndexCorrupted` on a schema version mismatch.
    pub fn open(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Ok(None);
        }
        let db = Database::open(&path).map_err(|e| index_err("failed to open index", e))?;
        let index = Self { db, path };
        index.check_schema()?;
        Ok(Some(index))
    }

    /// Opens the index at `path`, creating it if missing.
    pub fn open_or_create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(index) = Self::open(path)? {
            return Ok(index);
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path).map_err(|e| index_err("failed to create index", e))?;

        let txn = db.begin_write().map_err(|e| index_err("failed to begin write", e))?;
        {
            let mut table = txn
                .open_table(METADATA_TABLE)
                .map_err(|e| index_err("failed to open metadata table", e))?;
            table
                .insert("version", SEARCH_SCHEMA_VERSION)
                .map_err(|e| index_err("failed to write version", e))?;
        }
        txn.commit().map_err(|e| index_err("failed to commit", e))?;

        Ok(Self {
            db,
            path: path.to_path_buf(),
        })
    }

    /// Path of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Indexes one comment, replacing any previous entry for its id.
    pub fn index_comment(&self, doc: &CommentIndex) -> Result<()> {
        self.index_batch(std::slice::from_ref(doc))
    }

    /// Indexes many comments in a single write transaction.
    pub fn index_batch(&self, docs: &[CommentIndex]) -> Result<()> {
        let txn = self.begin_write()?;
        {
            let mut documents = txn
                .open_table(DOCUMENTS_TABLE)
                .map_err(|e| index_err("failed to open documents table", e))?;
            let mut terms = txn
                .open_table(TERMS_TABLE)
                .map_err(|e| index_err("failed to open terms table", e))?;

            for doc in docs {
                remove_document(&mut documents, &mut terms, &doc.id)?;

                let bytes = postcard::to_allocvec(doc)
                    .map_err(|e| CommentError::SearchError(e.to_string()))?;
                documents
                    .insert(doc.id.as_str(), bytes.as_slice())
                    .map_err(|e| index_err("failed to write document", e))?;

                for term in doc.terms() {
                    let mut ids = read_postings(&terms, &term)?;
                    ids.insert(doc.id.clone());
                    write_postings(&mut terms, &term, &ids)?;
                }
            }
        }
        txn.commit().map_err(|e| index_err("failed to commit", e))?;
        debug!(count = docs.len(), "indexed comments");
        Ok(())
    }

    /// Removes a comment from the index. Unknown ids are ignored.
    pub fn remove_comment(&self, id: &str) -> Result<()> {
        let txn = self.begin_write()?;
        {
            let mut documents = txn
                .open_table(DOCUMENTS_TABLE)
                .map_err(|e| index_err("failed to open documents table", e))?;
            let mut terms = txn
                .open_table(TERMS_TABLE)
                .map_err(|e| index_err("failed to open terms table", e))?;
            remove_document(&mut documents, &mut terms, id)?;
        }
        txn.commit().map_err(|e| index_err("failed to commit", e))?;
        Ok(())
    }

    /// Returns ids of comments containing every term of `query`, sorted by
    /// id and truncated to `limit`.
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<String>> {
        let query_terms: BTreeSet<String> = tokenize(query).into_iter().collect();
        if query_terms.is_empty() {
            return Ok(Vec::new());
        }

        let txn = self.begin_read()?;
        let terms = match txn.open_table(TERMS_TABLE) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(index_err("failed to open terms table", e)),
        };

        let mut matches: Option<BTreeSet<String>> = None;
        for term in &query_terms {
            let ids = read_postings(&terms, term)?;
            matches = Some(match matches {
                Some(current) => current.intersection(&ids).cloned().collect(),
                None => ids,
            });
            if matches.as_ref().is_some_and(BTreeSet::is_empty) {
                break;
            }
        }

        Ok(matches
            .unwrap_or_default()
            .into_iter()
            .take(limit)
            .collect())
    }

    /// Looks up the stored projection for an id.
    pub fn document(&self, id: &str) -> Result<Option<CommentIndex>> {
        let txn = self.begin_read()?;
        let documents = match txn.open_table(DOCUMENTS_TABLE) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(index_err("failed to open documents table", e)),
        };
        let guard = documents
            .get(id)
            .map_err(|e| index_err("failed to read document", e))?;
        match guard {
            Some(bytes) => postcard::from_bytes(bytes.value())
                .map(Some)
                .map_err(|e| CommentError::IndexCorrupted {
                    message: format!("document {}: {}", id, e),
                }),
            None => Ok(None),
        }
    }

    /// Number of indexed comments.
    pub fn len(&self) -> Result<usize> {
        let txn = self.begin_read()?;
        match txn.open_table(DOCUMENTS_TABLE) {
            Ok(table) => {
                let count = table.len().map_err(|e| index_err("failed to count", e))?;
                Ok(count as usize)
            }
            Err(TableError::TableDoesNotExist(_)) => Ok(0),
            Err(e) => Err(index_err("failed to open documents table", e)),
        }
    }

    /// True when no comment is indexed.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Drops every indexed comment.
    pub fn clear(&self) -> Result<()> {
        let txn = self.begin_write()?;
        txn.delete_table(DOCUMENTS_TABLE)
            .map_err(|e| index_err("failed to clear documents", e))?;
        txn.delete_table(TERMS_TABLE)
            .map_err(|e| index_err("failed to clear terms", e))?;
        txn.commit().map_err(|e| index_err("failed to commit", e))?;
        Ok(())
    }

    fn check_schema(&self) -> Result<()> {
        let txn = self.begin_read()?;
        if let Ok(table) = txn.open_table(METADATA_TABLE) {
            if let Some(version) = table.get("version").ok().flatten() {
                let found = version.value();
                if found != SEARCH_SCHEMA_VERSION {
                    return Err(CommentError::IndexCorrupted {
                        message: format!(
                            "schema version mismatch: found {}, expected {}",
                            found, SEARCH_SCHEMA_VERSION
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    fn begin_read(&self) -> Result<redb::ReadTransaction> {
        self.db
            .begin_read()
            .map_err(|e| index_err("failed to begin read", e))
    }

    fn begin_write(&self) -> Result<redb::WriteTransaction> {
        self.db
            .begin_write()
            .map_err(|e| index_err("failed to begin write", e))
    }
}

fn index_err(context: &str, e: impl Display) -> CommentError {
    CommentError::SearchError(format!("{}: {}", context, e))
}

fn read_postings(
    terms: &impl ReadableTable<&'static str, &'static [u8]>,
    term: &str,
) -> Result<BTreeSet<String>> {
    let guard = terms
        .get(term)
        .map_err(|e| index_err("failed to read term", e))?;
    match guard {
        Some(bytes) => postcard::from_bytes(bytes.value()).map_err(|e| CommentError::IndexCorrupted {
            message: format!("postings for {:?}: {}", term, e),
        }),
        None => Ok(BTreeSet::new()),
    }
}

fn write_postings(
    terms: &mut redb::Table<'_, &'static str, &'static [u8]>,
    term: &str,
    ids: &BTreeSet<String>,
) -> Result<()> {
    if ids.is_empty() {
        terms
            .remove(term)
            .map_err(|e| index_err("failed to remove term", e))?;
        return Ok(());
    }
    let bytes = postcard::to_allocvec(ids).map_err(|e| CommentError::SearchError(e.to_string()))?;
    terms
        .insert(term, bytes.as_slice())
        .map_err(|e| index_err("failed to write term", e))?;
    Ok(())
}

fn remove_document(
    documents: &mut redb::Table<'_, &'static str, &'static [u8]>,
    terms: &mut redb::Table<'_, &'static str, &'static [u8]>,
    id: &str,
) -> Result<()> {
    let previous: Option<CommentIndex> = {
        let guard = documents
            .get(id)
            .map_err(|e| index_err("failed to read document", e))?;
        match guard {
            Some(bytes) => Some(postcard::from_bytes(bytes.value()).map_err(|e| {
                CommentError::IndexCorrupted {
                    message: format!("document {}: {}", id, e),
                }
            })?),
            None => None,
        }
    };
    let Some(previous) = previous else {
        return Ok(());
    };

    for term in previous.terms() {
        let mut ids = read_postings(&*terms, &term)?;
        ids.remove(id);
        write_postings(terms, &term, &ids)?;
    }
    documents
        .remove(id)
        .map_err(|e| index_err("failed to remove document", e))?;
    Ok(())
}

impl CommentRepo {
    /// Location of the search index database.
    pub fn search_index_path(&self) -> PathBuf {
        self.comments_dir().join(INDEX_FILE)
    }

    /// Opens the search index if it has been built.
    pub fn open_search_index(&self) -> Result<Option<SearchIndex>> {
        SearchIndex::open(self.search_index_path())
    }

    /// Rebuilds the search index from every live comment in the repository.
    ///
    /// Returns the number of indexed comments.
    pub fn index_comments(&self) -> Result<usize> {
        let index = SearchIndex::open_or_create(self.search_index_path())?;
        let docs: Vec<CommentIndex> = self
            .all_comments()?
            .iter()
            .filter(|c| !c.deleted)
            .filter_map(CommentIndex::from_comment)
            .collect();
        index.clear()?;
        index.index_batch(&docs)?;
        Ok(docs.len())
    }

    /// Updates an existing index after a comment moved from `old_id` to
    /// `new_id`. Does nothing when no index has been built.
    pub fn refresh_search_index(&self, old_id: Option<&str>, new_id: &str) -> Result<()> {
        let Some(index) = self.open_search_index()? else {
            return Ok(());
        };
        if let Some(old_id) = old_id {
            index.remove_comment(old_id)?;
        }
        let comment = self.comment_by_id(new_id)?;
        match CommentIndex::from_comment(&comment) {
            Some(doc) if !comment.deleted => index.index_comment(&doc),
            _ => Ok(()),
        }
    }

    /// Finds live comments matching every term of `query`.
    ///
    /// # Errors
    ///
    /// Returns `SearchError` if the index has not been built.
    pub fn search_comments(&self, query: &str, limit: usize) -> Result<Vec<Comment>> {
        let index = self.open_search_index()?.ok_or_else(|| {
            CommentError::SearchError("no search index, run 'git-comment index' first".to_string())
        })?;

        let mut comments = Vec::new();
        for id in index.search(query, limit)? {
            match self.comment_by_id(&id) {
                Ok(comment) if !comment.deleted => comments.push(comment),
                Ok(_) => debug!(id = %id, "skipping deleted comment"),
                Err(e) => warn!(id = %id, error = %e, "skipping stale index entry"),
            }
        }
        Ok(comments)
    }
}
