use super::assertions::Assertion;
use super::clock::MockClock;
use super::steps::ScenarioStep;
use super::workspace::TestWorkspace;
use anyhow::{anyhow, bail, Context, Result};
use comment_core::{
    Comment, CommentRepo, Diff, DiffLineType, DiffPrinter, FileRef, FormatConfig, Formatter,
};
use std::collections::HashMap;

/// Context lines requested when diffing for association checks.
const CONTEXT_LINES: u32 = 3;

/// Executes scenarios against a real git repository
pub struct ScenarioRunner {
    workspace: TestWorkspace,
    repo: CommentRepo,
    clock: MockClock,
    /// Commit label -> full hash
    commits: HashMap<String, String>,
    /// Comment label -> current id
    comments: HashMap<String, String>,
    current_step: usize,
}

impl ScenarioRunner {
    /// Create a runner over a fresh repository with one root commit
    pub fn new() -> Result<Self> {
        let workspace = TestWorkspace::new()?;
        let clock = MockClock::new();
        let repo = workspace
            .open_comments()?
            .with_time_provider(clock.as_provider());

        Ok(Self {
            workspace,
            repo,
            clock,
            commits: HashMap::new(),
            comments: HashMap::new(),
            current_step: 0,
        })
    }

    /// Get current step number
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    /// Execute all steps in sequence
    pub fn execute(&mut self, steps: &[ScenarioStep]) -> Result<()> {
        for (i, step) in steps.iter().enumerate() {
            self.current_step = i;
            self.execute_step(step)
                .with_context(|| format!("Step {}: {:?}", i, step))?;
        }
        Ok(())
    }

    /// Execute a single step
    fn execute_step(&mut self, step: &ScenarioStep) -> Result<()> {
        match step {
            ScenarioStep::WriteFile { path, content } => self.workspace.write_file(path, content),
            ScenarioStep::RemoveFile { path } => self.workspace.remove_file(path),
            ScenarioStep::Commit { label } => {
                let hash = self.workspace.commit_all(label)?;
                self.commits.insert(label.clone(), hash);
                Ok(())
            }

            ScenarioStep::AddComment {
                label,
                commit,
                file_ref,
                message,
            } => {
                let commit = commit
                    .as_deref()
                    .map(|c| self.revision(c))
                    .unwrap_or_default();
                let file_ref = file_ref.as_deref().map(FileRef::parse);
                let id = self.repo.create_comment(&commit, None, message, file_ref)?;
                self.repo.refresh_search_index(None, &id)?;
                self.comments.insert(label.clone(), id);
                Ok(())
            }
            ScenarioStep::AddCommentAs {
                label,
                author,
                message,
            } => {
                let id = self.repo.create_comment("", Some(author), message, None)?;
                self.repo.refresh_search_index(None, &id)?;
                self.comments.insert(label.clone(), id);
                Ok(())
            }
            ScenarioStep::AmendComment { label, message } => {
                let old_id = self.comment_id(label)?;
                let new_id = self.repo.update_comment(&old_id, None, message)?;
                self.repo.refresh_search_index(Some(&old_id), &new_id)?;
                self.comments.insert(label.clone(), new_id);
                Ok(())
            }
            ScenarioStep::DeleteComment { label } => {
                let old_id = self.comment_id(label)?;
                let new_id = self.repo.delete_comment(&old_id)?;
                self.repo.refresh_search_index(Some(&old_id), &new_id)?;
                self.comments.insert(label.clone(), new_id);
                Ok(())
            }

            ScenarioStep::IndexComments => {
                self.repo.index_comments()?;
                Ok(())
            }
            ScenarioStep::VersionCheck { version } => {
                self.repo.version_check(version)?;
                Ok(())
            }
            ScenarioStep::VersionUpdate { version } => Ok(self.repo.version_update(version)?),

            ScenarioStep::Wait { duration } => {
                self.clock.advance(*duration);
                Ok(())
            }

            ScenarioStep::Assert { assertion } => self.check(assertion),
        }
    }

    fn check(&self, assertion: &Assertion) -> Result<()> {
        match assertion {
            Assertion::CommentCount { commit, count } => {
                let actual = self.repo.comment_count_on_commit(&self.revision(commit))?;
                if actual != *count {
                    bail!("expected {} comments on {}, found {}", count, commit, actual);
                }
                Ok(())
            }
            Assertion::CommentContent { label, content } => {
                let comment = self.comment(label)?;
                if comment.content != *content {
                    bail!("comment {} has content {:?}", label, comment.content);
                }
                Ok(())
            }
            Assertion::CommentAuthor { label, name } => {
                let comment = self.comment(label)?;
                if comment.author.name != *name {
                    bail!("comment {} authored by {:?}", label, comment.author.name);
                }
                Ok(())
            }
            Assertion::CommentAmendedBy { label, name } => {
                let comment = self.comment(label)?;
                if comment.amender.name != *name {
                    bail!("comment {} amended by {:?}", label, comment.amender.name);
                }
                Ok(())
            }
            Assertion::CommentIsTombstone { label } => {
                if !self.comment(label)?.deleted {
                    bail!("comment {} is not deleted", label);
                }
                Ok(())
            }
            Assertion::CommentResolves { id, label } => {
                let expected = self.comment_id(label)?;
                let resolved = self.repo.comment_by_id(id)?.id;
                if resolved.as_deref() != Some(expected.as_str()) {
                    bail!("{} resolved to {:?}, expected {}", id, resolved, expected);
                }
                Ok(())
            }

            Assertion::CommentOnLine {
                revision,
                label,
                path,
                line,
            } => {
                let id = self.comment_id(label)?;
                let diff = self.diff(revision)?;
                let (file_path, number) = locate(&diff, &id)
                    .ok_or_else(|| anyhow!("comment {} not attached to any line", label))?;
                if file_path != *path || number != Some(*line) {
                    bail!(
                        "comment {} attached to {}:{:?}, expected {}:{}",
                        label,
                        file_path,
                        number,
                        path,
                        line
                    );
                }
                Ok(())
            }
            Assertion::CommentUnassigned { revision, label } => {
                let id = self.comment_id(label)?;
                let diff = self.diff(revision)?;
                let unassigned = diff
                    .files
                    .iter()
                    .filter(|f| f.is_unassigned())
                    .flat_map(|f| &f.lines)
                    .any(|l| has_comment(&l.comments, &id));
                if !unassigned {
                    bail!("comment {} is not in the unassigned block", label);
                }
                Ok(())
            }
            Assertion::CommentNotInDiff { revision, label } => {
                let id = self.comment_id(label)?;
                let diff = self.diff(revision)?;
                let present = diff
                    .files
                    .iter()
                    .flat_map(|f| &f.lines)
                    .any(|l| has_comment(&l.comments, &id));
                if present {
                    bail!("comment {} unexpectedly present in diff", label);
                }
                Ok(())
            }

            Assertion::LogContains {
                revision,
                lines_before,
                lines_after,
                text,
            } => {
                let log = self.render_log(revision, *lines_before, *lines_after)?;
                if !log.contains(text.as_str()) {
                    bail!("log does not contain {:?}:\n{}", text, log);
                }
                Ok(())
            }
            Assertion::LogNotContains {
                revision,
                lines_before,
                lines_after,
                text,
            } => {
                let log = self.render_log(revision, *lines_before, *lines_after)?;
                if log.contains(text.as_str()) {
                    bail!("log unexpectedly contains {:?}:\n{}", text, log);
                }
                Ok(())
            }

            Assertion::SearchFinds { query, label } => {
                if !self.search_hits(query, label)? {
                    bail!("search {:?} did not return {}", query, label);
                }
                Ok(())
            }
            Assertion::SearchMisses { query, label } => {
                if self.search_hits(query, label)? {
                    bail!("search {:?} unexpectedly returned {}", query, label);
                }
                Ok(())
            }

            Assertion::StoredVersion(version) => {
                let stored = self.repo.stored_version()?;
                if stored.as_deref() != Some(version.as_str()) {
                    bail!("stored version is {:?}, expected {}", stored, version);
                }
                Ok(())
            }
            Assertion::VersionCheckFails { version, contains } => {
                match self.repo.version_check(version) {
                    Ok(status) => bail!("version check passed with {:?}", status),
                    Err(e) if e.to_string().contains(contains.as_str()) => Ok(()),
                    Err(e) => bail!("unexpected version error: {}", e),
                }
            }

            Assertion::Custom(check) => check(&self.repo),
        }
    }

    /// Replaces commit labels in a revision, keeping `..` ranges intact.
    fn revision(&self, revision: &str) -> String {
        revision
            .split("..")
            .map(|part| self.commits.get(part).map(String::as_str).unwrap_or(part))
            .collect::<Vec<_>>()
            .join("..")
    }

    fn comment_id(&self, label: &str) -> Result<String> {
        self.comments
            .get(label)
            .cloned()
            .ok_or_else(|| anyhow!("unknown comment label {:?}", label))
    }

    fn comment(&self, label: &str) -> Result<Comment> {
        Ok(self.repo.comment_by_id(&self.comment_id(label)?)?)
    }

    fn diff(&self, revision: &str) -> Result<Diff> {
        Ok(self
            .repo
            .diff_commits(&self.revision(revision), CONTEXT_LINES)?)
    }

    fn render_log(&self, revision: &str, lines_before: usize, lines_after: usize) -> Result<String> {
        let context = lines_before.max(lines_after) as u32;
        let diff = self.repo.diff_commits(&self.revision(revision), context)?;
        let formatter = Formatter::new(FormatConfig {
            margin: false,
            ..FormatConfig::default()
        });
        let mut out = String::new();
        DiffPrinter::new(&mut out, &formatter, lines_before, lines_after).print_diff(&diff)?;
        Ok(out)
    }

    fn search_hits(&self, query: &str, label: &str) -> Result<bool> {
        let id = self.comment_id(label)?;
        let hits = self.repo.search_comments(query, 20)?;
        Ok(has_comment(&hits, &id))
    }
}

fn has_comment(comments: &[Comment], id: &str) -> bool {
    comments.iter().any(|c| c.id.as_deref() == Some(id))
}

/// Finds the file path and side-appropriate line number a comment is
/// attached to.
fn locate(diff: &Diff, id: &str) -> Option<(String, Option<u32>)> {
    diff.files
        .iter()
        .filter(|f| !f.is_unassigned())
        .find_map(|file| {
            file.lines
                .iter()
                .find(|l| has_comment(&l.comments, id))
                .map(|line| match line.line_type {
                    DiffLineType::Remove => (file.old_path.clone(), line.old_line_number),
                    _ => (file.new_path.clone(), line.new_line_number),
                })
        })
}
