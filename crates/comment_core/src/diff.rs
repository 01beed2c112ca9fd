//! Tree diffs annotated with the comments that describe their lines.

use crate::comment::Comment;
use crate::commit_range::resolve_commits;
use crate::error::Result;
use crate::file_ref::LineType;
use crate::repo::CommentRepo;
use git2::{DiffOptions, Oid, Repository, Tree};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Path marker of the pseudo-file holding unattached comments.
pub const UNASSIGNED_COMMENTS_FILE: &str = "comments:";

/// Kind of a diff line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffLineType {
    Add,
    AddNewline,
    Remove,
    RemoveNewline,
    Context,
    Other,
    /// Carrier line of the unassigned-comments pseudo-file.
    UnassignedComments,
}

impl DiffLineType {
    fn from_origin(origin: git2::DiffLineType) -> Self {
        match origin {
            git2::DiffLineType::Context | git2::DiffLineType::ContextEOFNL => Self::Context,
            git2::DiffLineType::Addition => Self::Add,
            git2::DiffLineType::Deletion => Self::Remove,
            git2::DiffLineType::AddEOFNL => Self::AddNewline,
            git2::DiffLineType::DeleteEOFNL => Self::RemoveNewline,
            _ => Self::Other,
        }
    }
}

/// One line of a file diff with its attached comments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub line_type: DiffLineType,
    /// Raw line content, including any trailing newline.
    pub content: String,
    pub old_line_number: Option<u32>,
    pub new_line_number: Option<u32>,
    pub comments: Vec<Comment>,
}

impl DiffLine {
    /// Creates a line with no comments.
    pub fn new(
        line_type: DiffLineType,
        content: impl Into<String>,
        old_line_number: Option<u32>,
        new_line_number: Option<u32>,
    ) -> Self {
        Self {
            line_type,
            content: content.into(),
            old_line_number,
            new_line_number,
            comments: Vec::new(),
        }
    }

    /// True when at least one comment is attached.
    pub fn has_comments(&self) -> bool {
        !self.comments.is_empty()
    }
}

/// Changes to one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffFile {
    pub old_path: String,
    pub new_path: String,
    pub lines: Vec<DiffLine>,
}

impl DiffFile {
    /// True for the unassigned-comments pseudo-file.
    pub fn is_unassigned(&self) -> bool {
        self.old_path == UNASSIGNED_COMMENTS_FILE
    }
}

/// An annotated diff between two commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diff {
    pub files: Vec<DiffFile>,
    pub from_commit: Option<String>,
    pub to_commit: Option<String>,
}

type MatchKey = (String, u32, LineType);

/// Attaches comments to the diff lines they address.
///
/// Removed lines match `(old_path, old_line, Old)`; added and context lines
/// match `(new_path, new_line, New)`. Each comment attaches at most once.
/// Comments without a line, or that match nothing, are collected into a
/// trailing [`UNASSIGNED_COMMENTS_FILE`] entry, in input order.
pub fn associate(files: &mut Vec<DiffFile>, comments: Vec<Comment>) {
    let mut by_key: HashMap<MatchKey, Vec<(usize, Comment)>> = HashMap::new();
    let mut unassigned: Vec<(usize, Comment)> = Vec::new();

    for (position, comment) in comments.into_iter().enumerate() {
        match &comment.file_ref {
            Some(file_ref) if file_ref.has_line() && !file_ref.path.is_empty() => {
                let key = (file_ref.path.clone(), file_ref.line, file_ref.line_type);
                by_key.entry(key).or_default().push((position, comment));
            }
            _ => unassigned.push((position, comment)),
        }
    }

    for file in files.iter_mut() {
        for line in &mut file.lines {
            let key = match line.line_type {
                DiffLineType::Remove => line
                    .old_line_number
                    .map(|n| (file.old_path.clone(), n, LineType::Old)),
                DiffLineType::Add | DiffLineType::Context => line
                    .new_line_number
                    .map(|n| (file.new_path.clone(), n, LineType::New)),
                _ => None,
            };
            if let Some(matched) = key.and_then(|k| by_key.remove(&k)) {
                line.comments.extend(matched.into_iter().map(|(_, c)| c));
            }
        }
    }

    unassigned.extend(by_key.into_values().flatten());
    if unassigned.is_empty() {
        return;
    }
    unassigned.sort_by_key(|(position, _)| *position);

    let mut line = DiffLine::new(DiffLineType::UnassignedComments, "", None, None);
    line.comments = unassigned.into_iter().map(|(_, c)| c).collect();
    files.push(DiffFile {
        old_path: UNASSIGNED_COMMENTS_FILE.to_string(),
        new_path: String::new(),
        lines: vec![line],
    });
}

impl CommentRepo {
    /// Diffs a commit against its parent, or the two ends of a range, and
    /// attaches every live comment found on the commits in between.
    pub fn diff_commits(&self, commitish: &str, context_lines: u32) -> Result<Diff> {
        let repo = self.git();
        let range = resolve_commits(repo, commitish)?;

        let old_tree = tree_of(repo, range.parent)?;
        let new_tree = tree_of(repo, range.child)?;

        let mut opts = DiffOptions::new();
        opts.context_lines(context_lines);
        let diff = repo.diff_tree_to_tree(old_tree.as_ref(), new_tree.as_ref(), Some(&mut opts))?;

        let commits = range.commits(repo)?;
        let comments: Vec<Comment> = self
            .comments_on_commits(&commits)?
            .into_iter()
            .filter(|c| !c.deleted)
            .collect();
        debug!(commits = commits.len(), comments = comments.len(), "diffing commits");

        let mut files = collect_files(&diff)?;
        associate(&mut files, comments);

        Ok(Diff {
            files,
            from_commit: range.parent.map(|id| id.to_string()),
            to_commit: range.child.map(|id| id.to_string()),
        })
    }
}

fn tree_of(repo: &Repository, id: Option<Oid>) -> Result<Option<Tree<'_>>> {
    match id {
        Some(id) => Ok(Some(repo.find_commit(id)?.tree()?)),
        None => Ok(None),
    }
}

fn collect_files(diff: &git2::Diff<'_>) -> Result<Vec<DiffFile>> {
    let files: RefCell<Vec<DiffFile>> = RefCell::new(Vec::new());

    diff.foreach(
        &mut |delta, _progress| {
            files.borrow_mut().push(DiffFile {
                old_path: path_string(delta.old_file().path()),
                new_path: path_string(delta.new_file().path()),
                lines: Vec::new(),
            });
            true
        },
        None,
        None,
        Some(&mut |_delta, _hunk, line| {
            if let Some(file) = files.borrow_mut().last_mut() {
                file.lines.push(DiffLine::new(
                    DiffLineType::from_origin(line.origin_value()),
                    String::from_utf8_lossy(line.content()),
                    line.old_lineno(),
                    line.new_lineno(),
                ));
            }
            true
        }),
    )?;

    Ok(files.into_inner())
}

fn path_string(path: Option<&Path>) -> String {
    path.map(|p| p.to_string_lossy().replace('\\', "/"))
        .unwrap_or_default()
}
