use anyhow::Result;
use comment_core::CommentRepo;

/// Declarative assertions on comment state.
///
/// Comment and commit names are scenario labels.
pub enum Assertion {
    // Storage
    CommentCount {
        commit: String,
        count: usize,
    },
    CommentContent {
        label: String,
        content: String,
    },
    CommentAuthor {
        label: String,
        name: String,
    },
    CommentAmendedBy {
        label: String,
        name: String,
    },
    CommentIsTombstone {
        label: String,
    },
    CommentResolves {
        id: String,
        label: String,
    },

    // Diff association
    CommentOnLine {
        revision: String,
        label: String,
        path: String,
        line: u32,
    },
    CommentUnassigned {
        revision: String,
        label: String,
    },
    CommentNotInDiff {
        revision: String,
        label: String,
    },

    // Log rendering
    LogContains {
        revision: String,
        lines_before: usize,
        lines_after: usize,
        text: String,
    },
    LogNotContains {
        revision: String,
        lines_before: usize,
        lines_after: usize,
        text: String,
    },

    // Search
    SearchFinds {
        query: String,
        label: String,
    },
    SearchMisses {
        query: String,
        label: String,
    },

    // Version
    StoredVersion(String),
    VersionCheckFails {
        version: String,
        contains: String,
    },

    // Custom
    Custom(Box<dyn Fn(&CommentRepo) -> Result<()> + Send + Sync>),
}

impl std::fmt::Debug for Assertion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CommentCount { commit, count } => {
                write!(f, "CommentCount {{ commit: {:?}, count: {} }}", commit, count)
            }
            Self::CommentContent { label, content } => {
                write!(f, "CommentContent {{ label: {:?}, content: {:?} }}", label, content)
            }
            Self::CommentAuthor { label, name } => {
                write!(f, "CommentAuthor {{ label: {:?}, name: {:?} }}", label, name)
            }
            Self::CommentAmendedBy { label, name } => {
                write!(f, "CommentAmendedBy {{ label: {:?}, name: {:?} }}", label, name)
            }
            Self::CommentIsTombstone { label } => {
                write!(f, "CommentIsTombstone {{ label: {:?} }}", label)
            }
            Self::CommentResolves { id, label } => {
                write!(f, "CommentResolves {{ id: {:?}, label: {:?} }}", id, label)
            }
            Self::CommentOnLine {
                revision,
                label,
                path,
                line,
            } => write!(
                f,
                "CommentOnLine {{ revision: {:?}, label: {:?}, path: {:?}, line: {} }}",
                revision, label, path, line
            ),
            Self::CommentUnassigned { revision, label } => {
                write!(f, "CommentUnassigned {{ revision: {:?}, label: {:?} }}", revision, label)
            }
            Self::CommentNotInDiff { revision, label } => {
                write!(f, "CommentNotInDiff {{ revision: {:?}, label: {:?} }}", revision, label)
            }
            Self::LogContains { revision, text, .. } => {
                write!(f, "LogContains {{ revision: {:?}, text: {:?} }}", revision, text)
            }
            Self::LogNotContains { revision, text, .. } => {
                write!(f, "LogNotContains {{ revision: {:?}, text: {:?} }}", revision, text)
            }
            Self::SearchFinds { query, label } => {
                write!(f, "SearchFinds {{ query: {:?}, label: {:?} }}", query, label)
            }
            Self::SearchMisses { query, label } => {
                write!(f, "SearchMisses {{ query: {:?}, label: {:?} }}", query, label)
            }
            Self::StoredVersion(v) => write!(f, "StoredVersion({:?})", v),
            Self::VersionCheckFails { version, contains } => write!(
                f,
                "VersionCheckFails {{ version: {:?}, contains: {:?} }}",
                version, contains
            ),
            Self::Custom(_) => write!(f, "Custom(<fn>)"),
        }
    }
}
