//! Scenario Test Utilities
//!
//! Shared helpers for tests that drive whole runs from task files on disk.
//!
//! ## Test Philosophy
//!
//! - **Files in, report out**: Tests go through the same loader the binary uses
//! - **Deterministic runs**: Same files and configuration give the same outcome
//! - **Local failures**: A broken task never changes what the others report

use sim_scheduler::{Scheduler, SchedulerError, SimConfig, SimulationOutcome, TaskDescriptor};
use std::fs;
use std::io;
use std::path::Path;
use task_loader::TaskLoader;
use tempfile::TempDir;

/// The disk-read task
pub const TASK_A: &str = "#T=100\nx new 50\nx[10]\nread disk\n";
/// Declares `y` twice
pub const TASK_B: &str = "#T=10\ny new 5\ny new 3\n";
/// Reads one byte past the end of `z`
pub const TASK_C: &str = "z new 5\nz[5]\n";

/// Temporary directory of `.tsk` files
pub struct TaskDir {
    dir: TempDir,
}

impl TaskDir {
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Writes `<name>.tsk`
    pub fn write(&self, name: &str, text: &str) -> io::Result<()> {
        fs::write(self.loader().path_for(name), text)
    }

    pub fn loader(&self) -> TaskLoader {
        TaskLoader::new(self.dir.path())
    }

    /// Loads `names` and runs them with the default configuration
    pub fn run(&self, names: &[&str]) -> Result<SimulationOutcome, SchedulerError> {
        self.run_with(SimConfig::default(), names)
    }

    pub fn run_with(
        &self,
        config: SimConfig,
        names: &[&str],
    ) -> Result<SimulationOutcome, SchedulerError> {
        let batch = self.loader().load_batch(names);
        Scheduler::new(config, batch)?.run()
    }
}

/// Finds a task of an outcome by name
pub fn task<'a>(outcome: &'a SimulationOutcome, name: &str) -> &'a TaskDescriptor {
    outcome
        .tasks
        .iter()
        .find(|task| task.name() == name)
        .unwrap_or_else(|| panic!("no task named {}", name))
}
