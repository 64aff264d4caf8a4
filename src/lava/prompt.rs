//! # Interactive Input
//!
//! Parameters never touch the terminal directly. Everything they need from the
//! user goes through a [`Prompter`]: one blocking `ask` per line of input and a
//! `say` for menu lines and notices.
//!
//! - [`TerminalPrompter`]: production implementation over any `BufRead`/`Write`
//!   pair, usually stdin/stdout via [`TerminalPrompter::stdio`].
//! - [`ScriptedPrompter`]: replays a fixed list of answers and records every
//!   prompt it was shown. Tests use it instead of a real terminal; running out
//!   of answers behaves like the user closing stdin.
//!
//! End of input is reported as `Ok(None)` rather than an error. Deciding what
//! that means (fall back to an old value, stop a list, give up) is the
//! parameter's job.

use crate::error::Result;
use std::collections::VecDeque;
use std::io::{self, BufRead, StdinLock, Stdout, Write};

pub trait Prompter {
    /// Shows `message` and reads one line of input, without its line ending.
    /// Returns `Ok(None)` at end of input.
    fn ask(&mut self, message: &str) -> Result<Option<String>>;

    /// Shows a full line of text (menu entries, hints).
    fn say(&mut self, line: &str) -> Result<()>;
}

pub struct TerminalPrompter<R, W> {
    input: R,
    output: W,
}

impl TerminalPrompter<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn ask(&mut self, message: &str) -> Result<Option<String>> {
        write!(self.output, "{}", message)?;
        self.output.flush()?;

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => {
                // Keep the next prompt off the unanswered one.
                writeln!(self.output)?;
                Ok(None)
            }
            Ok(_) => Ok(Some(line.trim_end_matches(['\n', '\r']).to_string())),
            // Ctrl-C style interruptions count as no answer for this parameter only.
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn say(&mut self, line: &str) -> Result<()> {
        writeln!(self.output, "{}", line)?;
        Ok(())
    }
}

/// Replays canned answers. `None` entries (or running out) read as end of input.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<Option<String>>,
    pub prompts: Vec<String>,
    pub lines: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(|a| Some(a.into())).collect(),
            ..Self::default()
        }
    }

    pub fn then_eof(mut self) -> Self {
        self.answers.push_back(None);
        self
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, message: &str) -> Result<Option<String>> {
        self.prompts.push(message.to_string());
        Ok(self.answers.pop_front().flatten())
    }

    fn say(&mut self, line: &str) -> Result<()> {
        self.lines.push(line.to_string());
        Ok(())
    }
}
