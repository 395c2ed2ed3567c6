//! Instruction sources
//!
//! A task reads its program one line at a time from an [`InstructionSource`].
//! The scheduler owns the source through the task and drops it when the task
//! finishes.

use std::collections::VecDeque;
use std::fmt;
use std::io;

/// Forward-only stream of instruction lines
pub trait InstructionSource: fmt::Debug {
    /// Returns the next line without its line terminator
    ///
    /// `Ok(None)` marks the end of the program.
    fn next_line(&mut self) -> io::Result<Option<String>>;
}

/// In-memory instruction source
#[derive(Debug, Clone, Default)]
pub struct ScriptSource {
    lines: VecDeque<String>,
}

impl ScriptSource {
    /// Creates a source that yields `lines` in order
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a source from the text of a task file
    pub fn from_text(text: &str) -> Self {
        Self::new(text.lines())
    }

    /// Returns the number of lines not read yet
    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

impl InstructionSource for ScriptSource {
    fn next_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.lines.pop_front())
    }
}
