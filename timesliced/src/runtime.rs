//! # Host Runtime
//!
//! Loads the tasks, runs the scheduler and renders the report.

use crate::args::RunConfig;
use metrics_report::{ReportError, SimulationReport};
use sim_scheduler::{Scheduler, SchedulerError, SimConfig};
use std::fs;
use std::io;
use std::path::Path;
use task_loader::TaskLoader;
use thiserror::Error;

/// Host runtime error types
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Failed to read config {path}: {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),
}

/// Reads a JSON simulation configuration
///
/// Missing fields take their default values.
pub fn load_config(path: impl AsRef<Path>) -> Result<SimConfig, RunError> {
    let path = path.as_ref();
    let data = fs::read_to_string(path).map_err(|source| RunError::ConfigRead {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|source| RunError::ConfigParse {
        path: path.display().to_string(),
        source,
    })
}

/// Runs the simulation described by `config` and returns the rendered report
pub fn run(config: &RunConfig) -> Result<String, RunError> {
    let sim_config = match &config.config_path {
        Some(path) => load_config(path)?,
        None => SimConfig::default(),
    };

    let loader = TaskLoader::new(&config.dir);
    let batch = loader.load_batch(&config.task_names);
    log::info!(
        "starting {} tasks from {}",
        batch.len(),
        config.dir.display()
    );

    let outcome = Scheduler::new(sim_config, batch)?.run()?;
    let report = SimulationReport::from_outcome(&outcome);
    Ok(report.render(config.format)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_report::ReportFormat;
    use tempfile::tempdir;

    #[test]
    fn test_run_renders_report() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.tsk"), "#T=100\nx new 50\nx[10]\nread disk\n").unwrap();

        let config = RunConfig {
            task_names: vec!["a".to_string()],
            dir: dir.path().to_path_buf(),
            ..RunConfig::default()
        };
        let text = run(&config).unwrap();
        assert!(text.contains("- Task: a"));
        assert!(text.contains("I/O time = 5 ut"));
    }

    #[test]
    fn test_partial_config_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sim.json");
        fs::write(&path, r#"{ "quantum": 3, "max_rounds": 100 }"#).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.quantum, 3);
        assert_eq!(config.max_rounds, Some(100));
        assert_eq!(config.suspended_time, 5);
    }

    #[test]
    fn test_missing_config_file() {
        let dir = tempdir().unwrap();
        let result = load_config(dir.path().join("nope.json"));
        assert!(matches!(result, Err(RunError::ConfigRead { .. })));
    }

    #[test]
    fn test_malformed_config_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sim.json");
        fs::write(&path, "{ quantum: }").unwrap();
        assert!(matches!(load_config(&path), Err(RunError::ConfigParse { .. })));
    }

    #[test]
    fn test_invalid_config_stops_run() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sim.json");
        fs::write(&path, r#"{ "quantum": 0 }"#).unwrap();
        fs::write(dir.path().join("a.tsk"), "x new 1\n").unwrap();

        let config = RunConfig {
            task_names: vec!["a".to_string()],
            dir: dir.path().to_path_buf(),
            config_path: Some(path),
            format: ReportFormat::Json,
            log_level: None,
        };
        assert!(matches!(
            run(&config),
            Err(RunError::Scheduler(SchedulerError::Config(_)))
        ));
    }
}
