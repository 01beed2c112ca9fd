//! Streams an annotated diff, showing a bounded window of context around
//! commented lines.

use crate::diff::{Diff, DiffFile, DiffLine};
use crate::error::Result;
use crate::format::Formatter;
use std::collections::VecDeque;

/// Destination of rendered output.
pub trait Renderer {
    /// Appends text.
    fn write(&mut self, text: &str) -> Result<()>;

    /// Flushes and closes the output. Called once, after the last write.
    fn finish(&mut self) -> Result<()>;
}

impl Renderer for String {
    fn write(&mut self, text: &str) -> Result<()> {
        self.push_str(text);
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    BeforeComment,
    AfterComment,
}

/// Context-windowed diff printer.
///
/// Before a commented line at most `lines_before` plain lines are shown,
/// after it at most `lines_after`. Windows of nearby comments merge without
/// repeating lines.
pub struct DiffPrinter<'a, R: Renderer + ?Sized> {
    renderer: &'a mut R,
    formatter: &'a Formatter,
    lines_before: usize,
    lines_after: usize,
    full_diff: bool,
}

impl<'a, R: Renderer + ?Sized> DiffPrinter<'a, R> {
    pub fn new(
        renderer: &'a mut R,
        formatter: &'a Formatter,
        lines_before: usize,
        lines_after: usize,
    ) -> Self {
        Self {
            renderer,
            formatter,
            lines_before,
            lines_after,
            full_diff: false,
        }
    }

    /// Prints every line instead of only the context windows.
    pub fn full_diff(mut self, enabled: bool) -> Self {
        self.full_diff = enabled;
        self
    }

    /// Prints the whole diff and finishes the renderer.
    pub fn print_diff(&mut self, diff: &Diff) -> Result<()> {
        for file in &diff.files {
            self.print_file(file)?;
        }
        self.renderer.finish()
    }

    fn print_file(&mut self, file: &DiffFile) -> Result<()> {
        let mut pass = FilePass {
            file,
            state: State::BeforeComment,
            before: VecDeque::with_capacity(self.lines_before),
            after: Vec::with_capacity(self.lines_after),
            printed_header: false,
        };

        for line in &file.lines {
            if line.has_comments() {
                self.flush_after(&mut pass)?;
                while let Some(buffered) = pass.before.pop_front() {
                    self.print_line(&mut pass, buffered)?;
                }
                self.print_line(&mut pass, line)?;
                for comment in &line.comments {
                    self.renderer.write(&self.formatter.format_comment(comment))?;
                }
                pass.state = if self.lines_after == 0 {
                    State::BeforeComment
                } else {
                    State::AfterComment
                };
            } else if self.full_diff {
                self.print_line(&mut pass, line)?;
            } else if pass.state == State::AfterComment {
                pass.after.push(line);
                if pass.after.len() >= self.lines_after {
                    self.flush_after(&mut pass)?;
                    pass.state = State::BeforeComment;
                }
            } else if self.lines_before > 0 {
                if pass.before.len() == self.lines_before {
                    pass.before.pop_front();
                }
                pass.before.push_back(line);
            }
        }

        self.flush_after(&mut pass)
    }

    fn flush_after<'f>(&mut self, pass: &mut FilePass<'f>) -> Result<()> {
        let lines = std::mem::take(&mut pass.after);
        for line in lines {
            self.print_line(pass, line)?;
        }
        Ok(())
    }

    fn print_line<'f>(&mut self, pass: &mut FilePass<'f>, line: &DiffLine) -> Result<()> {
        if !pass.printed_header {
            self.renderer.write(&self.formatter.format_file_path(pass.file))?;
            pass.printed_header = true;
        }
        self.renderer.write(&self.formatter.format_line(line))
    }
}

/// Buffers for the file currently being printed.
struct FilePass<'f> {
    file: &'f DiffFile,
    state: State,
    before: VecDeque<&'f DiffLine>,
    after: Vec<&'f DiffLine>,
    printed_header: bool,
}
