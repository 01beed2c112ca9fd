//! Output through the user's pager once it outgrows the terminal.

use comment_core::{Renderer, Result};
use console::Term;
use std::io::{self, ErrorKind, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use tracing::debug;

const DEFAULT_TERM_WIDTH: u16 = 80;

/// Renderer that prints directly while output fits on screen and switches
/// to the pager as soon as it does not.
pub struct Pager {
    command: String,
    disabled: bool,
    term_height: u16,
    buffer: String,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    finished: bool,
}

impl Pager {
    /// Creates a pager running `command`.
    ///
    /// Paging is also disabled when stdout is not a terminal.
    pub fn new(command: impl Into<String>, disabled: bool) -> Self {
        let term = Term::stdout();
        let term_height = term.size_checked().map(|(rows, _)| rows).unwrap_or(0);
        Self {
            command: command.into(),
            disabled: disabled || !term.is_term(),
            term_height,
            buffer: String::new(),
            child: None,
            stdin: None,
            finished: false,
        }
    }

    /// Terminal width, or 80 columns when unknown.
    pub fn term_width() -> u16 {
        Term::stdout()
            .size_checked()
            .map(|(_, cols)| cols)
            .unwrap_or(DEFAULT_TERM_WIDTH)
    }

    fn exceeds_screen(&self) -> bool {
        // Unknown height: always page.
        if self.term_height == 0 {
            return true;
        }
        let lines = self.buffer.matches('\n').count() + 1;
        lines > usize::from(self.term_height - 1)
    }

    fn spawn(&mut self) -> Result<()> {
        debug!(command = %self.command, "starting pager");
        let mut command = Command::new("sh");
        command
            .arg("-c")
            .arg(&self.command)
            .stdin(Stdio::piped());
        if std::env::var_os("LESS").is_none() {
            command.env("LESS", "FRX");
        }
        let mut child = command.spawn()?;
        self.stdin = child.stdin.take();
        self.child = Some(child);
        Ok(())
    }

    fn forward(&mut self) -> Result<()> {
        let Some(stdin) = self.stdin.as_mut() else {
            return Ok(());
        };
        match stdin.write_all(self.buffer.as_bytes()) {
            Ok(()) => {}
            // The user quit the pager early.
            Err(e) if e.kind() == ErrorKind::BrokenPipe => self.stdin = None,
            Err(e) => return Err(e.into()),
        }
        self.buffer.clear();
        Ok(())
    }
}

impl Renderer for Pager {
    fn write(&mut self, text: &str) -> Result<()> {
        if self.disabled {
            let mut stdout = io::stdout().lock();
            return match stdout.write_all(text.as_bytes()) {
                Err(e) if e.kind() == ErrorKind::BrokenPipe => Ok(()),
                other => other.map_err(Into::into),
            };
        }

        self.buffer.push_str(text);
        if self.child.is_none() {
            if !self.exceeds_screen() {
                return Ok(());
            }
            self.spawn()?;
        }
        self.forward()
    }

    fn finish(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;

        match self.child.take() {
            Some(mut child) => {
                drop(self.stdin.take());
                child.wait()?;
            }
            None => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(self.buffer.as_bytes())?;
                stdout.flush()?;
                self.buffer.clear();
            }
        }
        Ok(())
    }
}

impl Drop for Pager {
    fn drop(&mut self) {
        let _ = self.finish();
    }
}
