//! Instruction interpreter
//!
//! Executes a task's instructions for one scheduling round, charging time to
//! the task and to the shared [`RoundRobin`] counters.
//!
//! Every instruction costs one time unit except the header. A violation
//! aborts the task on the spot: its time is taken back out of the shared
//! totals and its source is released.

use crate::config::SimConfig;
use crate::error::TaskViolation;
use crate::task::{MemoryAccess, TaskDescriptor, TaskStatus, Variable};
use core_types::limits::UT;
use instruction_set::Instruction;
use paging::{apply_declaration, apply_header};
use serde::{Deserialize, Serialize};

/// Scheduler-wide counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRobin {
    /// CPU time of every task that has not aborted
    pub total_cpu_clocks: u64,
    /// I/O time of every task that has not aborted
    pub total_output_time: u64,
    /// Sum of positive `end - cpu - start` over finished tasks
    pub wait_time: u64,
    /// Time elapsed in the current round, starting at one unit
    pub preemption_time_counter: u64,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self {
            total_cpu_clocks: 0,
            total_output_time: 0,
            wait_time: 0,
            preemption_time_counter: UT,
        }
    }

    /// Starts a new round
    pub fn reset_counter(&mut self) {
        self.preemption_time_counter = UT;
    }
}

impl Default for RoundRobin {
    fn default() -> Self {
        Self::new()
    }
}

/// Why a slice ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SliceEnd {
    /// The quantum ran out with the task still RUNNING
    Preempted,
    /// The task started a disk read
    Suspended,
    /// The task finished, normally or not
    Finished { aborted: bool },
}

/// What happened during one slice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceReport {
    /// Chargeable instructions executed
    pub charged: u64,
    pub end: SliceEnd,
}

/// Runs a RUNNING task until its quantum is used up or it leaves RUNNING
///
/// The task is left RUNNING when preempted; requeueing it is the
/// scheduler's job.
pub fn run_slice(ctx: &mut RoundRobin, task: &mut TaskDescriptor, config: &SimConfig) -> SliceReport {
    debug_assert_eq!(task.status(), TaskStatus::Running);
    let mut charged = 0;

    while ctx.preemption_time_counter <= config.quantum {
        let line = match task.task.next_line() {
            Ok(Some(line)) => line,
            Ok(None) => {
                finish(ctx, task, false);
                break;
            }
            Err(err) => {
                abort(ctx, task, TaskViolation::SourceRead(err.to_string()));
                break;
            }
        };

        let instruction = Instruction::parse(&line);
        let chargeable = instruction.is_chargeable();
        if chargeable {
            task.cpu_time += UT;
            ctx.total_cpu_clocks += UT;
            charged += 1;
        }

        log::trace!("{} executes {}", task.name(), instruction);
        if let Err(violation) = execute(ctx, task, instruction, config) {
            abort(ctx, task, violation);
        }
        // Counted even when the instruction ended the slice; the monitor
        // reads this as the round's elapsed time.
        if chargeable {
            ctx.preemption_time_counter += UT;
        }
        if task.status() != TaskStatus::Running {
            break;
        }
    }

    let end = match task.status() {
        TaskStatus::Suspended => SliceEnd::Suspended,
        TaskStatus::Finished => SliceEnd::Finished {
            aborted: task.aborted(),
        },
        _ => SliceEnd::Preempted,
    };
    SliceReport { charged, end }
}

/// Applies one instruction to a RUNNING task
///
/// Time has already been charged by the caller. An error leaves the task
/// untouched for the caller to abort.
pub fn execute(
    ctx: &mut RoundRobin,
    task: &mut TaskDescriptor,
    instruction: Instruction,
    config: &SimConfig,
) -> Result<(), TaskViolation> {
    let limits = config.paging_limits();

    match instruction {
        Instruction::Header { bytes } => {
            task.pagination =
                apply_header(&task.pagination, bytes, &limits).map_err(TaskViolation::HeaderSpace)?;
        }
        Instruction::New { name, size } => {
            if task.variable(&name).is_some() {
                return Err(TaskViolation::AlreadyDeclared { name });
            }
            let space = || TaskViolation::AllocationSpace {
                limit: limits.largest_logical_memory,
            };
            if task.variables.is_full() {
                return Err(space());
            }
            let placement =
                apply_declaration(&task.pagination, size, &limits).map_err(|_| space())?;

            let variable = Variable {
                name,
                size,
                logical: placement.logical,
                physical: placement.physical,
            };
            task.variables.try_push(variable).map_err(|_| space())?;
            task.pagination = placement.pagination;
        }
        Instruction::MemoryAccess { name, offset } => {
            let variable = task
                .variable(&name)
                .ok_or_else(|| TaskViolation::UndeclaredIdentifier { name: name.clone() })?;
            if offset >= variable.size {
                return Err(TaskViolation::OutOfBounds {
                    size: variable.size,
                    name,
                    offset,
                });
            }

            let access = MemoryAccess {
                logical_byte: variable.logical.byte_at(offset),
                physical_byte: variable.physical.byte_at(offset),
                variable: name,
                offset,
            };
            let capacity = task.accesses.capacity();
            task.accesses
                .try_push(access)
                .map_err(|_| TaskViolation::AccessLogFull { capacity })?;
        }
        Instruction::ReadDisk => {
            task.suspended_time += config.suspended_time;
            task.input_output_time += config.suspended_time;
            ctx.total_output_time += config.suspended_time;
            task.set_status(TaskStatus::Suspended);
        }
        Instruction::Unknown => finish(ctx, task, false),
    }

    Ok(())
}

/// Finishes a task and records its violation
pub fn abort(ctx: &mut RoundRobin, task: &mut TaskDescriptor, violation: TaskViolation) {
    log::warn!("{} aborted: {}", task.name(), violation);
    task.violation = Some(violation);
    finish(ctx, task, true);
}

/// Moves a task to FINISHED and settles its accounting
///
/// An aborted task gives its CPU and I/O time back; a completed one adds its
/// wait to the shared total when positive. The source is released here, on
/// every path.
pub fn finish(ctx: &mut RoundRobin, task: &mut TaskDescriptor, aborted: bool) {
    task.aborted |= aborted;
    task.set_status(TaskStatus::Finished);
    task.end_time = ctx.total_cpu_clocks;
    task.task.release();

    if task.aborted {
        ctx.total_cpu_clocks = ctx.total_cpu_clocks.saturating_sub(task.cpu_time);
        ctx.total_output_time = ctx.total_output_time.saturating_sub(task.input_output_time);
        return;
    }

    let wait = task
        .end_time
        .checked_sub(task.cpu_time)
        .and_then(|rest| rest.checked_sub(task.start_time()))
        .filter(|wait| *wait > 0);
    if let Some(wait) = wait {
        ctx.wait_time += wait;
    }
    log::debug!(
        "{} finished: cpu {} io {} end {}",
        task.name(),
        task.cpu_time,
        task.input_output_time,
        task.end_time
    );
}
