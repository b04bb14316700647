//! Operator prompts
//!
//! Every question servboot asks goes through a [`Prompter`]. On a terminal
//! that is [`TerminalPrompter`] (dialoguer); with piped stdin, and in tests,
//! it is [`LinePrompter`]. A closed input stream is always fatal: no component
//! can continue without the values it asked for.

use crate::error::{BootstrapError, Result};
use dialoguer::Input;
use std::io::{BufRead, ErrorKind, Write};

/// Source of operator answers
pub trait Prompter {
    /// Show `message` and return the operator's answer, trimmed of the line
    /// terminator but otherwise untouched.
    fn ask(&mut self, message: &str) -> Result<String>;
}

/// Whether an answer to the startup gate declines the session.
///
/// An empty answer declines, like an explicit `n` or `N`.
pub fn is_decline(answer: &str) -> bool {
    matches!(answer.trim(), "" | "n" | "N")
}

/// Interactive prompter backed by dialoguer
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn ask(&mut self, message: &str) -> Result<String> {
        match Input::<String>::new()
            .with_prompt(message)
            .allow_empty(true)
            .interact_text()
        {
            Ok(value) => Ok(value),
            Err(dialoguer::Error::IO(err)) if err.kind() == ErrorKind::UnexpectedEof => {
                Err(BootstrapError::input(format!(
                    "input closed while waiting for: {}",
                    message
                )))
            }
            Err(err) => Err(BootstrapError::input(format!(
                "failed to read answer to {:?}: {}",
                message, err
            ))),
        }
    }
}

/// Line-oriented prompter over any reader/writer pair
#[derive(Debug)]
pub struct LinePrompter<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Consume the prompter and return the writer, e.g. to inspect output
    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn ask(&mut self, message: &str) -> Result<String> {
        writeln!(self.writer, "{}", message)?;
        self.writer.flush()?;

        let mut line = String::new();
        let read = self
            .reader
            .read_line(&mut line)
            .map_err(|e| BootstrapError::input(format!("failed to read input: {}", e)))?;
        if read == 0 {
            return Err(BootstrapError::input(format!(
                "input closed while waiting for: {}",
                message
            )));
        }

        let trimmed = line.trim_end_matches(['\n', '\r']);
        Ok(trimmed.to_string())
    }
}
