//! # Metrics Report
//!
//! Turns a finished simulation into a report of per-task CPU, disk and
//! memory usage plus run-wide averages.
//!
//! Only tasks that completed appear in the per-task section. Aborted and
//! rejected tasks are listed separately with their reason, and none of
//! their time counts towards rates or averages.

use core_types::{ByteRange, PageAddress, TaskSlot};
use paging::{page_table, PageMapping};
use serde::{Deserialize, Serialize};
use sim_scheduler::{SimulationOutcome, TaskDescriptor};
use std::fmt::Write as _;
use thiserror::Error;

/// Report errors
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Output format of a rendered report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    Text,
    Json,
}

/// A variable and where its first and last byte live
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableReport {
    pub name: String,
    pub size: u64,
    pub logical: ByteRange,
    pub logical_first: PageAddress,
    pub logical_last: PageAddress,
    pub physical: ByteRange,
    pub physical_first: PageAddress,
    pub physical_last: PageAddress,
}

/// One recorded memory access
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessReport {
    pub variable: String,
    pub offset: u64,
    pub logical: PageAddress,
    pub physical: PageAddress,
}

/// Usage of a task that completed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskReport {
    pub slot: TaskSlot,
    pub name: String,
    pub cpu_time: u64,
    pub input_output_time: u64,
    /// Share of all CPU time, in percent
    pub cpu_rate: f64,
    /// Share of all disk time, in percent
    pub disk_rate: f64,
    pub logical_pages: u64,
    pub variables: Vec<VariableReport>,
    pub accesses: Vec<AccessReport>,
    pub page_table: Vec<PageMapping>,
}

/// A task that aborted or never ran
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbortedTask {
    pub slot: TaskSlot,
    pub name: String,
    pub reason: String,
}

/// Run-wide figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub successful_tasks: usize,
    pub total_cpu_clocks: u64,
    pub total_output_time: u64,
    pub wait_time: u64,
    pub average_execution_time: f64,
    pub average_wait_time: f64,
    pub rounds: u64,
}

/// Complete simulation report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub tasks: Vec<TaskReport>,
    pub aborted: Vec<AbortedTask>,
    pub summary: Summary,
}

/// `part / whole` in percent, 0 when `whole` is 0
fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

fn average(total: u64, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    total as f64 / count as f64
}

impl SimulationReport {
    /// Builds the report of a finished run
    pub fn from_outcome(outcome: &SimulationOutcome) -> Self {
        let totals = &outcome.totals;
        let page_size = outcome.config.page_size;
        let limits = outcome.config.paging_limits();

        let tasks = outcome
            .successful_tasks()
            .map(|task| TaskReport {
                slot: task.slot(),
                name: task.name().to_string(),
                cpu_time: task.cpu_time(),
                input_output_time: task.input_output_time(),
                cpu_rate: percent(task.cpu_time(), totals.total_cpu_clocks),
                disk_rate: percent(task.input_output_time(), totals.total_output_time),
                logical_pages: task.pagination().final_page,
                variables: task
                    .variables()
                    .iter()
                    .map(|variable| VariableReport {
                        name: variable.name.clone(),
                        size: variable.size,
                        logical: variable.logical,
                        logical_first: PageAddress::of(variable.logical.first, page_size),
                        logical_last: PageAddress::of(variable.logical.last, page_size),
                        physical: variable.physical,
                        physical_first: PageAddress::of(variable.physical.first, page_size),
                        physical_last: PageAddress::of(variable.physical.last, page_size),
                    })
                    .collect(),
                accesses: task
                    .accesses()
                    .iter()
                    .map(|access| AccessReport {
                        variable: access.variable.clone(),
                        offset: access.offset,
                        logical: PageAddress::of(access.logical_byte, page_size),
                        physical: PageAddress::of(access.physical_byte, page_size),
                    })
                    .collect(),
                page_table: page_table(task.pagination(), &limits),
            })
            .collect();

        let aborted = outcome
            .aborted_tasks()
            .map(|task| AbortedTask {
                slot: task.slot(),
                name: task.name().to_string(),
                reason: abort_reason(task),
            })
            .collect();

        let successful_tasks = outcome.successful_count();
        let summary = Summary {
            successful_tasks,
            total_cpu_clocks: totals.total_cpu_clocks,
            total_output_time: totals.total_output_time,
            wait_time: totals.wait_time,
            average_execution_time: average(totals.total_cpu_clocks, successful_tasks),
            average_wait_time: average(totals.wait_time, successful_tasks),
            rounds: outcome.rounds,
        };

        Self {
            tasks,
            aborted,
            summary,
        }
    }

    /// Renders the report in `format`
    pub fn render(&self, format: ReportFormat) -> Result<String, ReportError> {
        match format {
            ReportFormat::Text => Ok(self.render_text()),
            ReportFormat::Json => self.to_json(),
        }
    }

    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Renders the report for people
    pub fn render_text(&self) -> String {
        let mut out = String::new();

        for task in &self.tasks {
            render_task(&mut out, task);
        }

        if !self.aborted.is_empty() {
            let _ = writeln!(out, "\n- Aborted tasks");
            for task in &self.aborted {
                let _ = writeln!(out, "\t\t{} ({}): {}", task.name, task.slot, task.reason);
            }
        }

        let summary = &self.summary;
        let _ = writeln!(out, "\n- Round-Robin");
        let _ = writeln!(
            out,
            "\t\tAverage execution time = {:.2} ut",
            summary.average_execution_time
        );
        let _ = writeln!(
            out,
            "\t\tAverage wait time = {:.2} ut",
            summary.average_wait_time
        );
        out
    }
}

fn abort_reason(task: &TaskDescriptor) -> String {
    if let Some(reason) = task.rejection() {
        return reason.to_string();
    }
    task.violation()
        .map(ToString::to_string)
        .unwrap_or_else(|| "aborted".to_string())
}

fn render_task(out: &mut String, task: &TaskReport) {
    let _ = writeln!(out, "\n- Task: {}", task.name);
    let _ = writeln!(out, "\t- CPU and disk");
    let _ = writeln!(out, "\t\tCPU time = {} ut", task.cpu_time);
    let _ = writeln!(out, "\t\tI/O time = {} ut", task.input_output_time);
    let _ = writeln!(out, "\t\tCPU occupancy = {:.2}%", task.cpu_rate);
    let _ = writeln!(out, "\t\tDisk occupancy = {:.2}%", task.disk_rate);
    let _ = writeln!(out, "\t- Memory");
    let _ = writeln!(out, "\t\tLogical pages = {}", task.logical_pages);

    for variable in &task.variables {
        let _ = writeln!(out, "\n\t\t- {}", variable.name);
        let _ = writeln!(
            out,
            "\t\tLogical addresses = {} ( {} to {} )",
            variable.logical, variable.logical_first, variable.logical_last
        );
        let _ = writeln!(
            out,
            "\t\tPhysical addresses = {} ( {} to {} )",
            variable.physical, variable.physical_first, variable.physical_last
        );
    }

    for access in &task.accesses {
        let _ = writeln!(
            out,
            "\n\t\t{}[{}] -> Logical address = {}",
            access.variable, access.offset, access.logical
        );
        let _ = writeln!(out, "\t\t-> Physical address = {}", access.physical);
    }

    let _ = writeln!(out, "\n\t\t- Page table");
    for mapping in &task.page_table {
        let _ = writeln!(
            out,
            "\t\tLP {} ({}) --> PP {} ({})",
            mapping.logical_page, mapping.logical, mapping.physical_page, mapping.physical
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_scheduler::{Scheduler, ScriptSource, SimConfig, TaskBatch};

    fn outcome(scripts: &[(&str, &str)]) -> SimulationOutcome {
        let mut batch = TaskBatch::new();
        for (name, text) in scripts {
            batch.push_source(*name, Box::new(ScriptSource::from_text(text)));
        }
        Scheduler::new(SimConfig::default(), batch)
            .unwrap()
            .run()
            .unwrap()
    }

    #[test]
    fn test_percent_of_zero_is_zero() {
        assert_eq!(percent(3, 0), 0.0);
        assert_eq!(average(10, 0), 0.0);
        assert_eq!(percent(1, 4), 25.0);
    }

    #[test]
    fn test_single_task_report() {
        let report = SimulationReport::from_outcome(&outcome(&[(
            "a",
            "#T=100\nx new 50\nx[10]\nread disk\n",
        )]));

        assert_eq!(report.tasks.len(), 1);
        let a = &report.tasks[0];
        assert_eq!(a.cpu_time, 3);
        assert_eq!(a.input_output_time, 5);
        assert_eq!(a.cpu_rate, 100.0);
        assert_eq!(a.disk_rate, 100.0);
        assert_eq!(a.logical_pages, 2);

        let x = &a.variables[0];
        assert_eq!(x.logical_first, PageAddress { page: 1, offset: 0 });
        assert_eq!(x.logical_last, PageAddress { page: 1, offset: 49 });
        assert_eq!(x.physical_first, PageAddress { page: 41, offset: 0 });

        let access = &a.accesses[0];
        assert_eq!(access.logical, PageAddress { page: 1, offset: 10 });
        assert_eq!(access.physical, PageAddress { page: 41, offset: 10 });

        assert_eq!(a.page_table.len(), 2);
        assert_eq!(a.page_table[1].physical_page, 41);
        assert_eq!(report.summary.average_execution_time, 3.0);
        assert_eq!(report.summary.average_wait_time, 0.0);
    }

    #[test]
    fn test_aborted_tasks_listed_separately() {
        let report = SimulationReport::from_outcome(&outcome(&[
            ("ok", "x new 1\nx[0]\n"),
            ("dup", "y new 5\ny new 3\n"),
        ]));

        assert_eq!(report.tasks.len(), 1);
        assert_eq!(report.tasks[0].name, "ok");
        assert_eq!(report.tasks[0].cpu_rate, 100.0);
        assert_eq!(report.tasks[0].disk_rate, 0.0);
        assert_eq!(report.aborted.len(), 1);
        assert!(report.aborted[0].reason.contains("already declared"));
        assert_eq!(report.summary.successful_tasks, 1);
    }

    #[test]
    fn test_no_successful_task() {
        let report = SimulationReport::from_outcome(&outcome(&[("c", "z new 5\nz[5]\n")]));
        assert!(report.tasks.is_empty());
        assert_eq!(report.summary.average_execution_time, 0.0);
        assert_eq!(report.summary.average_wait_time, 0.0);
    }

    #[test]
    fn test_text_rendering() {
        let report = SimulationReport::from_outcome(&outcome(&[
            ("a", "#T=100\nx new 50\nx[10]\nread disk\n"),
            ("c", "z new 5\nz[5]\n"),
        ]));
        let text = report.render_text();

        assert!(text.contains("- Task: a"));
        assert!(text.contains("CPU time = 3 ut"));
        assert!(text.contains("Logical addresses = 512 to 561 ( 1 : 0 to 1 : 49 )"));
        assert!(text.contains("x[10] -> Logical address = 1 : 10"));
        assert!(text.contains("LP 0 (0 to 511) --> PP 40 (20480 to 20991)"));
        assert!(text.contains("- Aborted tasks"));
        assert!(text.contains("invalid memory access"));
        assert!(text.contains("Average execution time = 3.00 ut"));
        assert!(!text.contains("- Task: c"));
    }

    #[test]
    fn test_json_rendering() {
        let report = SimulationReport::from_outcome(&outcome(&[("a", "x new 1\n")]));
        let json = report.render(ReportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["tasks"][0]["name"], "a");
        assert_eq!(value["summary"]["successful_tasks"], 1);
        assert_eq!(value["tasks"][0]["variables"][0]["logical"]["first"], 1);
    }
}
