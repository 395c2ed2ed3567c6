//! Round-robin scheduler
//!
//! Drives a batch of tasks to completion, one round at a time.
//!
//! ## Round
//!
//! 1. Dequeue the head of the ready queue, if any, and run it for at most
//!    one quantum.
//! 2. A task still RUNNING afterwards goes back to the end of the queue.
//! 3. The suspension monitor counts every suspended task down by the time
//!    the round took, one unit for an idle round.
//! 4. The round counter is reset.
//!
//! The run ends when every task is FINISHED. Each step is recorded in an
//! audit log so runs can be compared and checked after the fact.

use crate::config::SimConfig;
use crate::error::SchedulerError;
use crate::interpreter::{run_slice, RoundRobin, SliceEnd};
use crate::monitor::tick_suspended;
use crate::queue::ReadyQueue;
use crate::source::InstructionSource;
use crate::task::{Task, TaskDescriptor, TaskStatus};
use core_types::TaskSlot;
use paging::Pagination;
use serde::{Deserialize, Serialize};

/// How a task left the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskOutcome {
    Completed,
    Aborted,
}

/// Scheduling event for the audit trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleEvent {
    /// Task was dequeued and set RUNNING
    TaskDispatched { slot: TaskSlot, round: u64 },
    /// Task used its quantum and was requeued
    TaskPreempted {
        slot: TaskSlot,
        round: u64,
        charged: u64,
    },
    /// Task started a disk read
    TaskSuspended {
        slot: TaskSlot,
        round: u64,
        charged: u64,
        suspended_time: u64,
    },
    /// Suspended task became READY again
    TaskResumed { slot: TaskSlot, round: u64 },
    /// Task reached FINISHED
    TaskFinished {
        slot: TaskSlot,
        round: u64,
        charged: u64,
        outcome: TaskOutcome,
    },
    /// Nothing was ready this round
    IdleRound { round: u64 },
}

#[derive(Debug)]
enum BatchEntry {
    Source {
        name: String,
        source: Box<dyn InstructionSource>,
    },
    Rejected {
        name: String,
        reason: String,
    },
}

/// Tasks handed to the scheduler, in arrival order
///
/// Each entry takes the next slot, rejected ones included.
#[derive(Debug, Default)]
pub struct TaskBatch {
    entries: Vec<BatchEntry>,
}

impl TaskBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a task that will read from `source`
    pub fn push_source(
        &mut self,
        name: impl Into<String>,
        source: Box<dyn InstructionSource>,
    ) -> TaskSlot {
        self.push(BatchEntry::Source {
            name: name.into(),
            source,
        })
    }

    /// Adds a task that failed validation and will never run
    pub fn push_rejected(&mut self, name: impl Into<String>, reason: impl Into<String>) -> TaskSlot {
        self.push(BatchEntry::Rejected {
            name: name.into(),
            reason: reason.into(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, entry: BatchEntry) -> TaskSlot {
        self.entries.push(entry);
        TaskSlot::new(self.entries.len() - 1)
    }
}

/// Final state of a run
#[derive(Debug)]
pub struct SimulationOutcome {
    pub config: SimConfig,
    pub tasks: Vec<TaskDescriptor>,
    pub totals: RoundRobin,
    pub rounds: u64,
    pub audit_log: Vec<ScheduleEvent>,
}

impl SimulationOutcome {
    /// Tasks that finished without aborting
    pub fn successful_tasks(&self) -> impl Iterator<Item = &TaskDescriptor> {
        self.tasks.iter().filter(|task| task.succeeded())
    }

    /// Tasks that aborted or were rejected
    pub fn aborted_tasks(&self) -> impl Iterator<Item = &TaskDescriptor> {
        self.tasks.iter().filter(|task| task.aborted())
    }

    pub fn successful_count(&self) -> usize {
        self.successful_tasks().count()
    }
}

/// Round-robin scheduler over one batch
pub struct Scheduler {
    config: SimConfig,
    tasks: Vec<TaskDescriptor>,
    ready: ReadyQueue,
    context: RoundRobin,
    rounds: u64,
    audit_log: Vec<ScheduleEvent>,
}

impl Scheduler {
    /// Builds the task descriptors and enqueues every runnable task
    ///
    /// Each task's arrival time is its slot, and its physical region starts
    /// right after the regions of the slots before it.
    pub fn new(config: SimConfig, batch: TaskBatch) -> Result<Self, SchedulerError> {
        config.validate()?;
        if batch.len() > config.max_tasks {
            return Err(SchedulerError::TooManyTasks {
                count: batch.len(),
                max: config.max_tasks,
            });
        }

        let limits = config.paging_limits();
        let mut ready = ReadyQueue::new();
        let mut tasks = Vec::with_capacity(batch.len());

        for (index, entry) in batch.entries.into_iter().enumerate() {
            let slot = TaskSlot::new(index);
            let descriptor = match entry {
                BatchEntry::Source { name, source } => {
                    let pagination =
                        Pagination::for_slot(slot, config.reserved_program_memory, &limits);
                    ready.enqueue(slot);
                    TaskDescriptor::new(
                        slot,
                        Task::new(name, source),
                        pagination,
                        config.max_variables,
                        config.max_accesses,
                    )
                }
                BatchEntry::Rejected { name, reason } => {
                    log::warn!("{} rejected before scheduling: {}", name, reason);
                    TaskDescriptor::rejected(slot, name, reason)
                }
            };
            tasks.push(descriptor);
        }

        Ok(Self {
            config,
            tasks,
            ready,
            context: RoundRobin::new(),
            rounds: 0,
            audit_log: Vec::new(),
        })
    }

    /// Returns true once every task is FINISHED
    pub fn is_finished(&self) -> bool {
        self.tasks.iter().all(TaskDescriptor::is_finished)
    }

    /// Runs one round
    ///
    /// Returns `Ok(false)` without doing anything when every task is
    /// already finished.
    pub fn step(&mut self) -> Result<bool, SchedulerError> {
        if self.is_finished() {
            return Ok(false);
        }
        if let Some(max_rounds) = self.config.max_rounds {
            if self.rounds >= max_rounds {
                return Err(SchedulerError::RoundLimitExceeded {
                    rounds: self.rounds,
                });
            }
        }

        self.rounds += 1;
        let round = self.rounds;

        match self.ready.dequeue() {
            Some(slot) => self.dispatch(slot, round),
            None => {
                log::debug!("round {}: nothing ready", round);
                self.audit_log.push(ScheduleEvent::IdleRound { round });
            }
        }

        let elapsed = self.context.preemption_time_counter;
        for slot in tick_suspended(&mut self.tasks, &mut self.ready, elapsed) {
            log::debug!("round {}: {} resumed", round, slot);
            self.audit_log.push(ScheduleEvent::TaskResumed { slot, round });
        }
        self.context.reset_counter();

        Ok(true)
    }

    /// Runs rounds until every task is finished
    pub fn run(mut self) -> Result<SimulationOutcome, SchedulerError> {
        while self.step()? {}
        log::info!(
            "simulation finished after {} rounds, {} cpu, {} io",
            self.rounds,
            self.context.total_cpu_clocks,
            self.context.total_output_time
        );
        Ok(self.into_outcome())
    }

    /// Consumes the scheduler, whatever state it is in
    pub fn into_outcome(self) -> SimulationOutcome {
        SimulationOutcome {
            config: self.config,
            tasks: self.tasks,
            totals: self.context,
            rounds: self.rounds,
            audit_log: self.audit_log,
        }
    }

    pub fn tasks(&self) -> &[TaskDescriptor] {
        &self.tasks
    }

    pub fn task(&self, slot: TaskSlot) -> Option<&TaskDescriptor> {
        self.tasks.get(slot.index())
    }

    pub fn context(&self) -> &RoundRobin {
        &self.context
    }

    pub fn rounds(&self) -> u64 {
        self.rounds
    }

    pub fn ready_count(&self) -> usize {
        self.ready.len()
    }

    /// Gets the audit log
    pub fn audit_log(&self) -> &[ScheduleEvent] {
        &self.audit_log
    }

    fn dispatch(&mut self, slot: TaskSlot, round: u64) {
        let Some(task) = self.tasks.get_mut(slot.index()) else {
            return;
        };
        task.set_status(TaskStatus::Running);
        log::debug!("round {}: dispatch {}", round, task.name());
        self.audit_log.push(ScheduleEvent::TaskDispatched { slot, round });

        let report = run_slice(&mut self.context, task, &self.config);
        let charged = report.charged;

        let event = match report.end {
            SliceEnd::Preempted => {
                task.set_status(TaskStatus::Ready);
                self.ready.enqueue(slot);
                log::debug!("round {}: preempt {} after {}", round, task.name(), charged);
                ScheduleEvent::TaskPreempted {
                    slot,
                    round,
                    charged,
                }
            }
            SliceEnd::Suspended => {
                log::debug!("round {}: {} waits on disk", round, task.name());
                ScheduleEvent::TaskSuspended {
                    slot,
                    round,
                    charged,
                    suspended_time: task.suspended_time(),
                }
            }
            SliceEnd::Finished { aborted } => ScheduleEvent::TaskFinished {
                slot,
                round,
                charged,
                outcome: if aborted {
                    TaskOutcome::Aborted
                } else {
                    TaskOutcome::Completed
                },
            },
        };
        self.audit_log.push(event);
    }
}
