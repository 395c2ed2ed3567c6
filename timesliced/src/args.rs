//! Command-line parsing

use core_types::limits::MAX_TASKS;
use metrics_report::ReportFormat;
use sim_logger::LogLevel;
use std::path::PathBuf;
use thiserror::Error;

/// Environment variable consulted when `--log-level` is absent
pub const LOG_LEVEL_ENV: &str = "TIMESLICE_LOG";

/// Command-line errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    #[error("Expected 1 to {max} task names, got {count}")]
    TaskCount { count: usize, max: usize },

    #[error("Missing value for {0}")]
    MissingValue(String),

    #[error("Invalid value for {option}: {value}")]
    InvalidValue { option: String, value: String },

    #[error("Unknown option: {0}")]
    UnknownOption(String),
}

/// Everything needed for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Task names, in arrival order
    pub task_names: Vec<String>,
    /// Directory holding the task files
    pub dir: PathBuf,
    /// Optional JSON simulation configuration
    pub config_path: Option<PathBuf>,
    pub format: ReportFormat,
    /// Level given on the command line, if any
    pub log_level: Option<LogLevel>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            task_names: Vec::new(),
            dir: PathBuf::from("."),
            config_path: None,
            format: ReportFormat::Text,
            log_level: None,
        }
    }
}

/// What the command line asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliAction {
    Run(RunConfig),
    Help,
}

/// Parses `args`, program name included
///
/// The task count is checked here so a bad invocation never reaches the
/// scheduler.
pub fn parse_args(args: &[String]) -> Result<CliAction, CliError> {
    let mut config = RunConfig::default();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--dir" | "-d" => {
                config.dir = PathBuf::from(value_of(args, &mut i)?);
            }
            "--config" | "-c" => {
                config.config_path = Some(PathBuf::from(value_of(args, &mut i)?));
            }
            "--format" | "-f" => {
                let value = value_of(args, &mut i)?;
                config.format = match value {
                    "text" => ReportFormat::Text,
                    "json" => ReportFormat::Json,
                    other => return Err(invalid("--format", other)),
                };
            }
            "--log-level" | "-l" => {
                let value = value_of(args, &mut i)?;
                config.log_level = Some(value.parse().map_err(|_| invalid("--log-level", value))?);
            }
            "--help" | "-h" => return Ok(CliAction::Help),
            other if other.starts_with('-') => {
                return Err(CliError::UnknownOption(other.to_string()));
            }
            name => config.task_names.push(name.to_string()),
        }
        i += 1;
    }

    let count = config.task_names.len();
    if count == 0 || count > MAX_TASKS {
        return Err(CliError::TaskCount {
            count,
            max: MAX_TASKS,
        });
    }

    Ok(CliAction::Run(config))
}

/// Picks the log level from the command line, then the environment
///
/// Falls back to warnings only.
pub fn resolve_log_level(
    cli: Option<LogLevel>,
    env: Option<&str>,
) -> Result<LogLevel, CliError> {
    if let Some(level) = cli {
        return Ok(level);
    }
    match env {
        Some(value) => value.parse().map_err(|_| invalid(LOG_LEVEL_ENV, value)),
        None => Ok(LogLevel::Warn),
    }
}

fn value_of<'a>(args: &'a [String], i: &mut usize) -> Result<&'a str, CliError> {
    let option = &args[*i];
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| CliError::MissingValue(option.clone()))
}

fn invalid(option: &str, value: &str) -> CliError {
    CliError::InvalidValue {
        option: option.to_string(),
        value: value.to_string(),
    }
}
