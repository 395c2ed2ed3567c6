//! Task file loader.
//!
//! A task named `demo` lives in `<dir>/demo.tsk`. The loader checks the file
//! against the instruction grammar before anything runs, then opens it again
//! as a [`FileSource`] that the scheduler reads one line per instruction.
//!
//! A task that fails to load is still part of the batch: it keeps its slot
//! and is reported as rejected.

use core_types::limits::{MAX_INSTRUCTIONS, MAX_LINE_LENGTH, TASK_FILE_EXTENSION};
use instruction_set::{classify, InstructionKind};
use sim_scheduler::{InstructionSource, TaskBatch};
use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that keep a task out of the schedule
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Task file not found: {0}")]
    NotFound(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Line {line}: invalid instruction '{text}'")]
    InvalidInstruction { line: usize, text: String },

    #[error("Line {line} is {length} characters long")]
    LineTooLong { line: usize, length: usize },

    #[error("Task has {count} instructions, at most {max} are allowed")]
    TooManyInstructions { count: usize, max: usize },

    #[error("Line {line}: header is only allowed on the first line")]
    MisplacedHeader { line: usize },
}

/// Checks the text of a task file
///
/// Returns the number of instructions. The header is optional and may only
/// appear on the first line; every other line must be a declaration, a
/// memory access or a disk read.
pub fn validate_text(
    text: &str,
    max_instructions: usize,
    max_line_length: usize,
) -> Result<usize, LoadError> {
    let count = text.lines().count();
    if count > max_instructions {
        return Err(LoadError::TooManyInstructions {
            count,
            max: max_instructions,
        });
    }

    for (index, content) in text.lines().enumerate() {
        let line = index + 1;
        let length = content.chars().count();
        if length > max_line_length {
            return Err(LoadError::LineTooLong { line, length });
        }

        match classify(content) {
            InstructionKind::Header if line > 1 => {
                return Err(LoadError::MisplacedHeader { line });
            }
            InstructionKind::Unknown => {
                return Err(LoadError::InvalidInstruction {
                    line,
                    text: content.to_string(),
                });
            }
            _ => {}
        }
    }

    Ok(count)
}

/// Instruction source backed by a task file
pub struct FileSource {
    path: PathBuf,
    reader: BufReader<File>,
}

impl FileSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self {
            path,
            reader: BufReader::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Debug for FileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileSource")
            .field("path", &self.path)
            .finish()
    }
}

impl InstructionSource for FileSource {
    fn next_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(Some(line))
    }
}

/// Loads task files from one directory
#[derive(Debug, Clone)]
pub struct TaskLoader {
    dir: PathBuf,
    max_instructions: usize,
    max_line_length: usize,
}

impl TaskLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            max_instructions: MAX_INSTRUCTIONS,
            max_line_length: MAX_LINE_LENGTH,
        }
    }

    /// Overrides the file size limits
    pub fn with_limits(mut self, max_instructions: usize, max_line_length: usize) -> Self {
        self.max_instructions = max_instructions;
        self.max_line_length = max_line_length;
        self
    }

    /// Returns the file a task name resolves to
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", name, TASK_FILE_EXTENSION))
    }

    /// Validates a task file and opens it for scheduling
    pub fn load(&self, name: &str) -> Result<FileSource, LoadError> {
        let path = self.path_for(name);
        if !path.exists() {
            return Err(LoadError::NotFound(path.display().to_string()));
        }

        let text = fs::read_to_string(&path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let count = validate_text(&text, self.max_instructions, self.max_line_length)?;
        log::debug!("{}: {} instructions", path.display(), count);

        FileSource::open(path)
    }

    /// Builds a batch in argument order
    ///
    /// Tasks that fail to load are added as rejected.
    pub fn load_batch<I, S>(&self, names: I) -> TaskBatch
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut batch = TaskBatch::new();
        for name in names {
            let name = name.as_ref();
            match self.load(name) {
                Ok(source) => {
                    batch.push_source(name, Box::new(source));
                }
                Err(err) => {
                    batch.push_rejected(name, err.to_string());
                }
            }
        }
        batch
    }
}
