//! Scheduler error types

use crate::config::ConfigError;
use paging::PagingError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Runtime violations that abort a single task
///
/// None of them is retried and none affects other tasks.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskViolation {
    /// A variable was declared twice
    #[error("tried to declare identifier ({name}) which is already declared")]
    AlreadyDeclared { name: String },

    /// Variable table full or logical memory exhausted
    #[error("exceeded the maximum allocation size of the reserved memory ({limit} bytes)")]
    AllocationSpace { limit: u64 },

    /// Access to a name that was never declared
    #[error("tried to access identifier ({name}) which was not declared")]
    UndeclaredIdentifier { name: String },

    /// Access past the end of a variable
    #[error("made an invalid memory access: {name}[{offset}] (size {size})")]
    OutOfBounds { name: String, offset: u64, size: u64 },

    /// The header could not be applied
    #[error("header rejected: {0}")]
    HeaderSpace(PagingError),

    /// The access log is full
    #[error("exceeded the {capacity} recorded memory accesses")]
    AccessLogFull { capacity: usize },

    /// The instruction source failed
    #[error("instruction source failed: {0}")]
    SourceRead(String),
}

/// Errors that stop a whole simulation before or while it runs
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Batch holds {count} tasks, at most {max} are allowed")]
    TooManyTasks { count: usize, max: usize },

    #[error("Simulation did not finish within {rounds} rounds")]
    RoundLimitExceeded { rounds: u64 },
}
