//! `path[:line[:old]]` locations inside a commit.

use std::fmt;

const OLD_MARKER: &str = ":old";

/// Which side of a change a line number refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LineType {
    /// Post-image: added or context lines.
    #[default]
    New,
    /// Pre-image: removed lines.
    Old,
}

/// A file, and optionally a line, that a comment refers to.
///
/// `line == 0` addresses the whole file.
///
/// # Examples
///
/// ```
/// use comment_core::{FileRef, LineType};
///
/// let file_ref = FileRef::parse("src/a.txt:12:old");
/// assert_eq!(file_ref.path, "src/a.txt");
/// assert_eq!(file_ref.line, 12);
/// assert_eq!(file_ref.line_type, LineType::Old);
/// assert_eq!(file_ref.to_string(), "src/a.txt:12:old");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileRef {
    /// Repository-relative path.
    pub path: String,
    /// 1-based line number, or 0 for the whole file.
    pub line: u32,
    /// Side of the change `line` refers to.
    pub line_type: LineType,
}

impl FileRef {
    /// Creates a ref to a line on the given side.
    pub fn new(path: impl Into<String>, line: u32, line_type: LineType) -> Self {
        Self {
            path: path.into(),
            line,
            line_type,
        }
    }

    /// Creates a ref to a whole file.
    pub fn whole_file(path: impl Into<String>) -> Self {
        Self::new(path, 0, LineType::New)
    }

    /// Parses `path`, `path:line` or `path:line:old`.
    ///
    /// Never fails: a suffix that is not a valid line stays part of the path.
    pub fn parse(input: &str) -> Self {
        let (rest, line_type) = match input.strip_suffix(OLD_MARKER) {
            Some(rest) if split_line(rest).is_some() => (rest, LineType::Old),
            _ => (input, LineType::New),
        };

        match split_line(rest) {
            Some((path, line)) => Self::new(path, line, line_type),
            None => Self::whole_file(input),
        }
    }

    /// Parses like [`FileRef::parse`], forcing the pre-image side when
    /// `mark_deleted` is set.
    pub fn parse_marked(input: &str, mark_deleted: bool) -> Self {
        let mut file_ref = Self::parse(input);
        if mark_deleted {
            file_ref.line_type = LineType::Old;
        }
        file_ref
    }

    /// True when the ref addresses a concrete line.
    pub fn has_line(&self) -> bool {
        self.line > 0
    }
}

impl fmt::Display for FileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line == 0 {
            return f.write_str(&self.path);
        }
        write!(f, "{}:{}", self.path, self.line)?;
        if self.line_type == LineType::Old {
            f.write_str(OLD_MARKER)?;
        }
        Ok(())
    }
}

fn split_line(input: &str) -> Option<(&str, u32)> {
    let (path, digits) = input.rsplit_once(':')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().map(|line| (path, line))
}
