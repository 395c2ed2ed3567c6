//! # Simulation Logger
//!
//! Structured backend for the `log` facade.
//!
//! ## Philosophy
//!
//! Logging is explicit and structured, not text-based or printf-style.
//! Every record becomes a [`LogEntry`] first and is only turned into text
//! when it is written out.

use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;
use std::sync::Mutex;
use thiserror::Error;

/// Logger errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoggerError {
    #[error("A logger is already installed")]
    AlreadyInstalled,

    #[error("Unknown log level '{0}'")]
    UnknownLevel(String),
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Instruction-by-instruction tracing
    Trace,
    /// Debug information
    Debug,
    /// Informational messages
    Info,
    /// Warnings
    Warn,
    /// Errors
    Error,
}

impl LogLevel {
    /// Maximum level the facade should let through
    pub fn to_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Trace => log::LevelFilter::Trace,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
        }
    }
}

impl From<log::Level> for LogLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Trace => LogLevel::Trace,
            log::Level::Debug => LogLevel::Debug,
            log::Level::Info => LogLevel::Info,
            log::Level::Warn => LogLevel::Warn,
            log::Level::Error => LogLevel::Error,
        }
    }
}

impl FromStr for LogLevel {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(LoggerError::UnknownLevel(s.to_string())),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        };
        f.pad(name)
    }
}

/// A structured log entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Log level
    pub level: LogLevel,
    /// Subsystem that emitted the entry
    pub target: String,
    /// Log message
    pub message: String,
    /// Structured fields
    pub fields: Vec<(String, String)>,
}

impl LogEntry {
    /// Creates a new log entry
    pub fn new(level: LogLevel, message: String) -> Self {
        Self {
            level,
            target: String::new(),
            message,
            fields: Vec::new(),
        }
    }

    /// Sets the emitting subsystem
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    /// Adds a field to the log entry
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    /// Builds an entry from a facade record
    pub fn from_record(record: &log::Record<'_>) -> Self {
        let mut entry = LogEntry::new(record.level().into(), record.args().to_string())
            .with_target(record.target());
        if let (Some(file), Some(line)) = (record.file(), record.line()) {
            entry = entry.with_field("at", format!("{}:{}", file, line));
        }
        entry
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:<5}] {}: {}", self.level, self.target, self.message)?;
        for (key, value) in &self.fields {
            write!(f, " {}={}", key, value)?;
        }
        Ok(())
    }
}

/// `log::Log` implementation writing one line per entry to stderr
///
/// With [`StructuredLogger::capturing`] entries are kept in memory instead.
pub struct StructuredLogger {
    level: LogLevel,
    captured: Option<Mutex<Vec<LogEntry>>>,
}

impl StructuredLogger {
    pub fn new(level: LogLevel) -> Self {
        Self {
            level,
            captured: None,
        }
    }

    /// Creates a logger that stores entries instead of writing them
    pub fn capturing(level: LogLevel) -> Self {
        Self {
            level,
            captured: Some(Mutex::new(Vec::new())),
        }
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Returns the captured entries so far
    pub fn entries(&self) -> Vec<LogEntry> {
        match &self.captured {
            Some(captured) => captured
                .lock()
                .map(|entries| entries.clone())
                .unwrap_or_default(),
            None => Vec::new(),
        }
    }
}

impl log::Log for StructuredLogger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        LogLevel::from(metadata.level()) >= self.level
    }

    fn log(&self, record: &log::Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let entry = LogEntry::from_record(record);
        match &self.captured {
            Some(captured) => {
                if let Ok(mut entries) = captured.lock() {
                    entries.push(entry);
                }
            }
            None => {
                let _ = writeln!(io::stderr().lock(), "{}", entry);
            }
        }
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }
}

/// Installs a [`StructuredLogger`] as the process-wide logger
pub fn init(level: LogLevel) -> Result<(), LoggerError> {
    log::set_boxed_logger(Box::new(StructuredLogger::new(level)))
        .map_err(|_| LoggerError::AlreadyInstalled)?;
    log::set_max_level(level.to_filter());
    Ok(())
}
