//! # Simulation Scheduler
//!
//! Round-robin scheduling of simulated tasks that declare variables, touch
//! memory and wait on disk reads.
//!
//! ## Philosophy
//!
//! - **Determinism first**: Same batch + same configuration => same run,
//!   down to the audit log.
//! - **Time is a counter**: Nothing sleeps. One executed instruction is one
//!   time unit and a disk read is a number of units to count down.
//! - **Violations stay local**: A task that breaks a rule is aborted and
//!   removed from the totals; the others carry on.
//! - **No ambient state**: All scheduler-wide counters live in one
//!   [`RoundRobin`] context passed to every operation.
//!
//! ## Design
//!
//! - [`TaskDescriptor`]: per-task state, owning its [`InstructionSource`]
//! - [`ReadyQueue`]: FIFO of task slots
//! - [`interpreter`]: executes instructions for one quantum
//! - [`monitor`]: counts suspended tasks down each round
//! - [`Scheduler`]: the round loop and its [`ScheduleEvent`] audit log

pub mod config;
pub mod error;
pub mod interpreter;
pub mod monitor;
pub mod queue;
pub mod round_robin;
pub mod source;
pub mod task;

pub use config::{ConfigError, SimConfig};
pub use error::{SchedulerError, TaskViolation};
pub use interpreter::{RoundRobin, SliceEnd, SliceReport};
pub use queue::ReadyQueue;
pub use round_robin::{ScheduleEvent, Scheduler, SimulationOutcome, TaskBatch, TaskOutcome};
pub use source::{InstructionSource, ScriptSource};
pub use task::{MemoryAccess, Task, TaskDescriptor, TaskStatus, Variable};
