//! Configuration for log rendering, search and the comment editor.
//!
//! Values come from `<git-dir>/comments/config.toml` when present and are
//! then overlaid with git configuration (`comment.logBefore`,
//! `comment.logAfter`, `comment.pretty`, `comment.template`, `color.pager`).

use crate::error::{CommentError, Result};
use crate::repo::CommentRepo;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILE: &str = "config.toml";

const LINES_BEFORE_KEY: &str = "comment.logBefore";
const LINES_AFTER_KEY: &str = "comment.logAfter";
const PRETTY_KEY: &str = "comment.pretty";
const TEMPLATE_KEY: &str = "comment.template";
const COLOR_KEY: &str = "color.pager";
const PAGER_KEY: &str = "core.pager";
const EDITOR_KEY: &str = "core.editor";

const DEFAULT_PAGER: &str = "less";
const DEFAULT_EDITOR: &str = "vi";

/// Comment tool configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// `git-comment log` rendering.
    #[serde(default)]
    pub log: LogConfig,

    /// Comment search.
    #[serde(default)]
    pub search: SearchConfig,

    /// Comment message editing.
    #[serde(default)]
    pub editor: EditorConfig,
}

impl Config {
    /// Load configuration from the comments directory.
    pub fn load(comments_dir: &Path) -> Result<Self> {
        let path = comments_dir.join(CONFIG_FILE);
        if path.exists() {
            let content = fs::read_to_string(&path)
                .map_err(|e| CommentError::ConfigError(format!("failed to read config: {}", e)))?;
            toml::from_str(&content)
                .map_err(|e| CommentError::ConfigError(format!("failed to parse config: {}", e)))
        } else {
            Ok(Config::default())
        }
    }

    /// Save configuration to the comments directory.
    pub fn save(&self, comments_dir: &Path) -> Result<()> {
        fs::create_dir_all(comments_dir)?;
        let content = toml::to_string_pretty(self)
            .map_err(|e| CommentError::ConfigError(format!("failed to serialize config: {}", e)))?;
        fs::write(comments_dir.join(CONFIG_FILE), content)
            .map_err(|e| CommentError::ConfigError(format!("failed to write config: {}", e)))?;
        Ok(())
    }

    /// Overlays values set in git configuration.
    pub fn apply_git_config(&mut self, git: &git2::Config) {
        if let Some(before) = git.get_i32(LINES_BEFORE_KEY).ok().and_then(non_negative) {
            self.log.lines_before = before;
        }
        if let Some(after) = git.get_i32(LINES_AFTER_KEY).ok().and_then(non_negative) {
            self.log.lines_after = after;
        }
        if let Ok(color) = git.get_bool(COLOR_KEY) {
            self.log.color = color;
        }
        if let Ok(pretty) = git.get_string(PRETTY_KEY) {
            self.log.pretty = pretty;
        }
        if let Ok(template) = git.get_string(TEMPLATE_KEY) {
            self.editor.template = Some(template);
        }
    }
}

/// `git-comment log` configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Context lines shown before a commented line (default: 3).
    pub lines_before: u32,

    /// Context lines shown after a commented line (default: 3).
    pub lines_after: u32,

    /// Colorize output (default: false).
    pub color: bool,

    /// Pretty format name or `format:` template (default: short).
    pub pretty: String,

    /// Show line numbers (default: false).
    pub line_numbers: bool,

    /// Draw a margin bar beside comments (default: true).
    pub margin: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            lines_before: 3,
            lines_after: 3,
            color: false,
            pretty: String::new(),
            line_numbers: false,
            margin: true,
        }
    }
}

impl LogConfig {
    /// Context lines requested from the diff engine.
    pub fn context_lines(&self) -> u32 {
        self.lines_before.max(self.lines_after)
    }
}

/// Search configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum search results to return (default: 20).
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { max_results: 20 }
    }
}

/// Editor configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EditorConfig {
    /// Path of a file whose content seeds new comment messages.
    pub template: Option<String>,
}

impl CommentRepo {
    /// Loads the effective configuration for this repository.
    pub fn config(&self) -> Result<Config> {
        let mut config = Config::load(&self.comments_dir())?;
        config.apply_git_config(&self.git().config()?);
        Ok(config)
    }

    /// Pager command: `GIT_PAGER`, `core.pager`, `PAGER`, then `less`.
    pub fn pager_command(&self) -> String {
        let git = self.git().config().ok();
        first_configured(
            [
                env_var("GIT_PAGER"),
                git.as_ref().and_then(|c| c.get_string(PAGER_KEY).ok()),
                env_var("PAGER"),
            ],
            DEFAULT_PAGER,
        )
    }

    /// Editor command: `GIT_EDITOR`, `core.editor`, `VISUAL`, `EDITOR`,
    /// then `vi`.
    pub fn editor_command(&self) -> String {
        let git = self.git().config().ok();
        first_configured(
            [
                env_var("GIT_EDITOR"),
                git.as_ref().and_then(|c| c.get_string(EDITOR_KEY).ok()),
                env_var("VISUAL"),
                env_var("EDITOR"),
            ],
            DEFAULT_EDITOR,
        )
    }
}

/// Picks the first non-blank candidate, or `default`.
pub fn first_configured(
    candidates: impl IntoIterator<Item = Option<String>>,
    default: &str,
) -> String {
    candidates
        .into_iter()
        .flatten()
        .find(|c| !c.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn non_negative(value: i32) -> Option<u32> {
    u32::try_from(value).ok()
}
