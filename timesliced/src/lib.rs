//! # Timeslice Host
//!
//! Command-line host for the round-robin simulator.
//!
//! ## Responsibilities
//!
//! The host:
//! - Parses the command line and the optional JSON configuration
//! - Resolves task names to task files and validates them
//! - Runs the scheduler to completion
//! - Renders the report as text or JSON
//!
//! ## Non-Responsibilities
//!
//! The host does NOT:
//! - Interpret instructions or touch task state
//! - Decide what counts as a violation

pub mod args;
pub mod runtime;

pub use args::{parse_args, resolve_log_level, CliAction, CliError, RunConfig, LOG_LEVEL_ENV};
pub use runtime::{load_config, run, RunError};
