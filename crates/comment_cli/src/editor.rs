//! Comment message editing in the user's preferred editor.

use anyhow::{bail, Context, Result};
use comment_core::CommentRepo;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;

const NO_MESSAGE_PROVIDED: &str = "Aborting comment, no message provided";
const DEFAULT_TEMPLATE_NAME: &str = ".gitcommenttemplate";
const DEFAULT_MESSAGE_TEMPLATE: &str =
    "\n# Enter comment content\n# Lines beginning with '#' will be stripped";

/// Opens the configured editor on a template and returns the cleaned message.
pub fn message_from_editor(repo: &CommentRepo) -> Result<String> {
    let template = template_text(repo)?;
    let editor = repo.editor_command();

    let mut file = tempfile::Builder::new()
        .prefix("gitc")
        .suffix(".txt")
        .tempfile()
        .context("Failed to create message file")?;
    file.write_all(template.as_bytes())?;
    file.flush()?;

    // Run through the shell so editor commands with arguments work.
    let status = Command::new("sh")
        .arg("-c")
        .arg(format!("{} \"$@\"", editor))
        .arg(&editor)
        .arg(file.path())
        .status()
        .with_context(|| format!("Failed to launch preferred editor '{}'", editor))?;
    if !status.success() {
        bail!("Editor '{}' exited with {}", editor, status);
    }

    let content = fs::read_to_string(file.path()).context("Failed to read message file")?;
    sanitize_message(&content)
}

/// Strips comment lines and surrounding whitespace.
///
/// Fails when nothing is left.
pub fn sanitize_message(content: &str) -> Result<String> {
    let stripped: Vec<&str> = content
        .lines()
        .filter(|line| !line.starts_with('#'))
        .collect();
    let message = stripped.join("\n").trim().to_string();
    if message.is_empty() {
        bail!(NO_MESSAGE_PROVIDED);
    }
    Ok(message)
}

/// Configured template, then `~/.gitcommenttemplate`, then the built-in one.
fn template_text(repo: &CommentRepo) -> Result<String> {
    if let Some(path) = repo.config()?.editor.template {
        return fs::read_to_string(&path)
            .with_context(|| format!("Failed to read comment template '{}'", path));
    }
    let home_template = home_template_path().and_then(|path| fs::read_to_string(path).ok());
    Ok(home_template
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| DEFAULT_MESSAGE_TEMPLATE.to_string()))
}

fn home_template_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(DEFAULT_TEMPLATE_NAME))
}
