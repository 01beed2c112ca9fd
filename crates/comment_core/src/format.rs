//! Text rendering of comments, diff lines and search results.
//!
//! Comment templates use `%` placeholders and nestable color wrappers such as
//! `yellow(%t)`. Wrappers only emit ANSI styles when color is enabled.

use crate::comment::{short_hash, Comment};
use crate::diff::{DiffFile, DiffLine, DiffLineType};
use crate::error::{CommentError, Result};
use crate::search::tokenize;
use chrono::SecondsFormat;
use console::Style;
use regex::{Captures, Regex, RegexBuilder};

const SHORT_FORMAT: &str = "blue([%h] %c %an <%ae>)%nyellow(%t)";
const FULL_FORMAT: &str = "commit  %H%ncomment %C%nAuthor: %an <%ae>%n%b";
const DISCO_FORMAT: &str = "cyan(%an) blue(<%ae>)%n[%h][%c] blue(%ad)%n%nyellow(%b)";
const RAW_FORMAT: &str = "yellow(comment %C)%n%v";
const FORMAT_PREFIX: &str = "format:";

const LINE_NUMBER_WIDTH: usize = 5;
const NEWLINE_MARKER: &str = "↵";
const MARGIN_BAR: &str = "│";

const COLORS: [&str; 8] = [
    "black", "red", "green", "yellow", "blue", "magenta", "cyan", "white",
];

/// Named or custom comment layout.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PrettyFormat {
    #[default]
    Short,
    Full,
    Raw,
    Disco,
    /// `format:<template>`
    Custom(String),
}

impl PrettyFormat {
    /// Parses `short`, `full`, `raw`, `disco` or `format:<template>`.
    /// Empty input selects `short`.
    pub fn parse(input: &str) -> Result<Self> {
        match input {
            "" | "short" => Ok(Self::Short),
            "full" => Ok(Self::Full),
            "raw" => Ok(Self::Raw),
            "disco" => Ok(Self::Disco),
            other => other
                .strip_prefix(FORMAT_PREFIX)
                .map(|t| Self::Custom(t.to_string()))
                .ok_or_else(|| CommentError::ConfigError(format!("unknown pretty format {:?}", other))),
        }
    }

    fn template(&self) -> &str {
        match self {
            Self::Short => SHORT_FORMAT,
            Self::Full => FULL_FORMAT,
            Self::Raw => RAW_FORMAT,
            Self::Disco => DISCO_FORMAT,
            Self::Custom(template) => template,
        }
    }
}

/// Rendering options, fixed for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatConfig {
    pub format: PrettyFormat,
    pub line_numbers: bool,
    pub color: bool,
    pub margin: bool,
    /// Width used by the `%d` divider.
    pub term_width: u16,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            format: PrettyFormat::Short,
            line_numbers: false,
            color: false,
            margin: true,
            term_width: 80,
        }
    }
}

/// Renders comments and diff lines as text.
#[derive(Debug, Clone)]
pub struct Formatter {
    config: FormatConfig,
}

impl Formatter {
    pub fn new(config: FormatConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FormatConfig {
        &self.config
    }

    /// Renders a comment block, followed by a blank line.
    pub fn format_comment(&self, comment: &Comment) -> String {
        let content = self.expand(self.config.format.template(), comment);
        let indent = if self.config.line_numbers {
            "\n            "
        } else {
            "\n  "
        };
        let bar = self.paint(&Style::new().magenta(), MARGIN_BAR);

        let mut out = String::new();
        for line in content.split('\n') {
            if self.config.margin {
                out.push_str(indent);
                out.push_str(&bar);
                out.push_str(line);
            } else {
                out.push_str(line);
                out.push('\n');
            }
        }
        out.push_str("\n\n");
        out
    }

    /// Renders `<prefix> <line numbers> <content>` terminated by a newline.
    pub fn format_line(&self, line: &DiffLine) -> String {
        if line.line_type == DiffLineType::UnassignedComments {
            return String::new();
        }
        let content = line.content.strip_suffix('\n').unwrap_or(&line.content);
        let (prefix, content) = match line.line_type {
            DiffLineType::Add => (self.paint_green("+"), self.paint_green(content)),
            DiffLineType::Remove => (self.paint_red("-"), self.paint_red(content)),
            DiffLineType::AddNewline => (self.paint_green("+"), NEWLINE_MARKER.to_string()),
            DiffLineType::RemoveNewline => (self.paint_red("-"), NEWLINE_MARKER.to_string()),
            _ => (" ".to_string(), content.to_string()),
        };
        let numbers = self.format_line_numbers(line.old_line_number, line.new_line_number);
        format!("{} {} {}\n", prefix, numbers, content)
    }

    /// Renders a file header as `\n<path>\n`.
    pub fn format_file_path(&self, file: &DiffFile) -> String {
        let path = match (file.old_path.as_str(), file.new_path.as_str()) {
            (old, new) if old == new => old.to_string(),
            ("", new) => new.to_string(),
            (old, "") => old.to_string(),
            (old, new) => format!("{} -> {}", old, new),
        };
        format!("\n{}\n", path)
    }

    /// Renders one search hit: `<author> <date> <commit7>:<file>  <title>`.
    ///
    /// Every term of `highlight` is colored in the title, ignoring case, when
    /// color is on.
    pub fn format_search_result(&self, comment: &Comment, highlight: &str) -> String {
        let file = comment
            .file_ref
            .as_ref()
            .map(|r| r.to_string())
            .map(|r| r.rsplit('/').next().unwrap_or_default().to_string())
            .unwrap_or_default();
        let header = format!(
            "{} {} {}:{}",
            comment.author.name,
            comment.create_time.format("%Y-%m-%d"),
            short_hash(&comment.commit),
            file
        );

        let mut title = comment.title().to_string();
        if comment.content.trim_end().contains('\n') {
            title.push_str("...");
        }
        if self.config.color {
            if let Some(pattern) = highlight_pattern(highlight) {
                title = pattern
                    .replace_all(&title, |caps: &Captures<'_>| self.paint_red(&caps[0]))
                    .into_owned();
            }
        }
        format!("{}  {}\n", self.paint(&Style::new().cyan(), &header), title)
    }

    fn format_line_numbers(&self, old: Option<u32>, new: Option<u32>) -> String {
        if !self.config.line_numbers {
            return String::new();
        }
        let mut old_text = pad_number(old);
        if old.is_some() {
            old_text = self.paint_red(&old_text);
        }
        let new_text = if new.is_none() || old == new {
            pad_number(None)
        } else {
            self.paint_green(&pad_number(new))
        };
        format!("{}{}", old_text, new_text)
    }

    fn placeholder(&self, key: &str, comment: &Comment) -> Option<String> {
        let id = comment.id.as_deref().unwrap_or_default();
        let value = match key {
            "C" => id.to_string(),
            "c" => short_hash(id).to_string(),
            "H" => comment.commit.clone(),
            "h" => short_hash(&comment.commit).to_string(),
            "f" => comment
                .file_ref
                .as_ref()
                .map(|r| r.path.clone())
                .unwrap_or_default(),
            "L" => comment
                .file_ref
                .as_ref()
                .map(|r| r.line.to_string())
                .unwrap_or_default(),
            "an" => comment.author.name.clone(),
            "ae" => comment.author.email.clone(),
            "ad" => comment.author.date.to_rfc3339_opts(SecondsFormat::Secs, true),
            "aU" => comment.author.date.timestamp().to_string(),
            "kn" => comment.amender.name.clone(),
            "ke" => comment.amender.email.clone(),
            "kd" => comment.amender.date.to_rfc3339_opts(SecondsFormat::Secs, true),
            "kU" => comment.amender.date.timestamp().to_string(),
            "b" => comment.content.clone(),
            "t" => comment.title().to_string(),
            "n" => "\n".to_string(),
            "d" => "-".repeat(usize::from(self.config.term_width)),
            "v" => comment.serialize(),
            "%" => "%".to_string(),
            _ => return None,
        };
        Some(value)
    }

    /// Expands placeholders and color wrappers in one pass.
    fn expand(&self, template: &str, comment: &Comment) -> String {
        // Each frame is an open color wrapper and the text rendered inside it.
        let mut frames: Vec<(Option<Style>, String)> = vec![(None, String::new())];
        let mut rest = template;

        while let Some(c) = rest.chars().next() {
            if let Some((style, after)) = open_wrapper(rest) {
                frames.push((Some(style), String::new()));
                rest = after;
                continue;
            }
            if c == ')' && frames.len() > 1 {
                if let Some((style, text)) = frames.pop() {
                    let painted = match style {
                        Some(style) => self.paint(&style, &text),
                        None => text,
                    };
                    push_to_top(&mut frames, &painted);
                }
                rest = &rest[1..];
                continue;
            }
            if c == '%' {
                let two = rest.get(1..3).and_then(|k| self.placeholder(k, comment));
                if let Some(value) = two {
                    push_to_top(&mut frames, &value);
                    rest = &rest[3..];
                    continue;
                }
                if let Some(value) = rest.get(1..2).and_then(|k| self.placeholder(k, comment)) {
                    push_to_top(&mut frames, &value);
                    rest = &rest[2..];
                    continue;
                }
            }
            push_to_top(&mut frames, &rest[..c.len_utf8()]);
            rest = &rest[c.len_utf8()..];
        }

        // Unclosed wrappers still color what they enclose.
        while frames.len() > 1 {
            if let Some((style, text)) = frames.pop() {
                let painted = match style {
                    Some(style) => self.paint(&style, &text),
                    None => text,
                };
                push_to_top(&mut frames, &painted);
            }
        }
        frames.pop().map(|(_, text)| text).unwrap_or_default()
    }

    fn paint(&self, style: &Style, text: &str) -> String {
        if self.config.color && !text.is_empty() {
            style.clone().force_styling(true).apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn paint_red(&self, text: &str) -> String {
        self.paint(&Style::new().red(), text)
    }

    fn paint_green(&self, text: &str) -> String {
        self.paint(&Style::new().green(), text)
    }
}

fn open_wrapper(input: &str) -> Option<(Style, &str)> {
    COLORS.iter().find_map(|name| {
        let after = input.strip_prefix(name)?.strip_prefix('(')?;
        Some((Style::from_dotted_str(name), after))
    })
}

fn push_to_top(frames: &mut [(Option<Style>, String)], text: &str) {
    if let Some((_, buffer)) = frames.last_mut() {
        buffer.push_str(text);
    }
}

fn pad_number(number: Option<u32>) -> String {
    let text = number.map(|n| n.to_string()).unwrap_or_default();
    format!("{:>width$}", text, width = LINE_NUMBER_WIDTH)
}

/// Case-insensitive alternation of the query's search terms, longest first.
fn highlight_pattern(query: &str) -> Option<Regex> {
    let mut terms = tokenize(query);
    if terms.is_empty() {
        return None;
    }
    terms.sort_by_key(|t| std::cmp::Reverse(t.len()));
    terms.dedup();
    let alternation = terms
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|");
    RegexBuilder::new(&alternation)
        .case_insensitive(true)
        .build()
        .ok()
}
