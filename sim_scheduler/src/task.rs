//! Task descriptors
//!
//! A [`TaskDescriptor`] holds everything the scheduler knows about one task:
//! its lifecycle state, its time counters, its memory layout and the
//! instruction source it reads from.

use crate::error::TaskViolation;
use crate::source::InstructionSource;
use core_types::{ByteRange, TaskSlot};
use paging::Pagination;
use serde::{Deserialize, Serialize};
use std::io;

/// Lifecycle state of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Waiting in the ready queue
    Ready,
    /// Executing instructions this round
    Running,
    /// Waiting for a disk read to complete
    Suspended,
    /// Terminal, normally or aborted
    Finished,
}

impl TaskStatus {
    /// Checks whether the state machine allows moving to `next`
    ///
    /// `Finished` is never left.
    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        matches!(
            (self, next),
            (TaskStatus::Ready, TaskStatus::Running)
                | (TaskStatus::Running, TaskStatus::Ready)
                | (TaskStatus::Running, TaskStatus::Suspended)
                | (TaskStatus::Running, TaskStatus::Finished)
                | (TaskStatus::Suspended, TaskStatus::Ready)
        )
    }
}

/// Identity and backing source of a task
#[derive(Debug)]
pub struct Task {
    name: String,
    source: Option<Box<dyn InstructionSource>>,
}

impl Task {
    /// Creates a task reading from `source`
    pub fn new(name: impl Into<String>, source: Box<dyn InstructionSource>) -> Self {
        Self {
            name: name.into(),
            source: Some(source),
        }
    }

    /// Creates a task that has no source to read from
    pub fn without_source(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true while the source has not been released
    pub fn is_open(&self) -> bool {
        self.source.is_some()
    }

    /// Reads the next line, `None` once the source is exhausted or released
    pub fn next_line(&mut self) -> io::Result<Option<String>> {
        match self.source.as_mut() {
            Some(source) => source.next_line(),
            None => Ok(None),
        }
    }

    /// Drops the source
    ///
    /// Returns true the first time, false once already released.
    pub fn release(&mut self) -> bool {
        self.source.take().is_some()
    }
}

/// A declared variable and where it lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub size: u64,
    pub logical: ByteRange,
    pub physical: ByteRange,
}

/// One successful memory access
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryAccess {
    pub variable: String,
    pub offset: u64,
    pub logical_byte: u64,
    pub physical_byte: u64,
}

/// Insertion-ordered list that refuses to grow past its capacity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedList<T> {
    items: Vec<T>,
    capacity: usize,
}

impl<T> BoundedList<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends `item`, handing it back if the list is full
    pub fn try_push(&mut self, item: T) -> Result<(), T> {
        if self.is_full() {
            return Err(item);
        }
        self.items.push(item);
        Ok(())
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

/// Mutable scheduling state of one task
#[derive(Debug)]
pub struct TaskDescriptor {
    slot: TaskSlot,
    pub(crate) task: Task,
    status: TaskStatus,
    pub(crate) aborted: bool,
    pub(crate) cpu_time: u64,
    pub(crate) input_output_time: u64,
    pub(crate) suspended_time: u64,
    start_time: u64,
    pub(crate) end_time: u64,
    pub(crate) pagination: Pagination,
    pub(crate) variables: BoundedList<Variable>,
    pub(crate) accesses: BoundedList<MemoryAccess>,
    pub(crate) violation: Option<TaskViolation>,
    rejection: Option<String>,
}

impl TaskDescriptor {
    /// Creates a READY descriptor
    ///
    /// The arrival time is the slot index.
    pub fn new(
        slot: TaskSlot,
        task: Task,
        pagination: Pagination,
        max_variables: usize,
        max_accesses: usize,
    ) -> Self {
        Self {
            slot,
            task,
            status: TaskStatus::Ready,
            aborted: false,
            cpu_time: 0,
            input_output_time: 0,
            suspended_time: 0,
            start_time: slot.as_u64(),
            end_time: 0,
            pagination,
            variables: BoundedList::with_capacity(max_variables),
            accesses: BoundedList::with_capacity(max_accesses),
            violation: None,
            rejection: None,
        }
    }

    /// Creates a descriptor for a task excluded before scheduling
    ///
    /// It starts FINISHED and aborted, and never enters the ready queue.
    pub fn rejected(slot: TaskSlot, name: impl Into<String>, reason: impl Into<String>) -> Self {
        let mut descriptor = Self::new(
            slot,
            Task::without_source(name),
            Pagination::default(),
            0,
            0,
        );
        descriptor.status = TaskStatus::Finished;
        descriptor.aborted = true;
        descriptor.rejection = Some(reason.into());
        descriptor
    }

    pub fn slot(&self) -> TaskSlot {
        self.slot
    }

    pub fn name(&self) -> &str {
        self.task.name()
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status == TaskStatus::Finished
    }

    pub fn aborted(&self) -> bool {
        self.aborted
    }

    /// Returns true for a task that finished without aborting
    pub fn succeeded(&self) -> bool {
        self.is_finished() && !self.aborted
    }

    pub fn cpu_time(&self) -> u64 {
        self.cpu_time
    }

    pub fn input_output_time(&self) -> u64 {
        self.input_output_time
    }

    /// Remaining suspension, in time units
    pub fn suspended_time(&self) -> u64 {
        self.suspended_time
    }

    pub fn start_time(&self) -> u64 {
        self.start_time
    }

    pub fn end_time(&self) -> u64 {
        self.end_time
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn variables(&self) -> &[Variable] {
        self.variables.as_slice()
    }

    /// Looks up a declared variable by name
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|variable| variable.name == name)
    }

    pub fn accesses(&self) -> &[MemoryAccess] {
        self.accesses.as_slice()
    }

    /// Violation that aborted the task while it ran
    pub fn violation(&self) -> Option<&TaskViolation> {
        self.violation.as_ref()
    }

    /// Reason the task was excluded before scheduling
    pub fn rejection(&self) -> Option<&str> {
        self.rejection.as_deref()
    }

    /// Returns true while the instruction source is held
    pub fn is_source_open(&self) -> bool {
        self.task.is_open()
    }

    pub(crate) fn set_status(&mut self, next: TaskStatus) {
        debug_assert!(
            self.status.can_transition_to(next),
            "illegal transition {:?} -> {:?} for {}",
            self.status,
            next,
            self.slot
        );
        self.status = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ScriptSource;

    fn descriptor(lines: &[&str]) -> TaskDescriptor {
        TaskDescriptor::new(
            TaskSlot::new(2),
            Task::new("demo", Box::new(ScriptSource::new(lines.iter().copied()))),
            Pagination::seeded(28672),
            10,
            64,
        )
    }

    #[test]
    fn test_allowed_transitions() {
        use TaskStatus::*;
        assert!(Ready.can_transition_to(Running));
        assert!(Running.can_transition_to(Ready));
        assert!(Running.can_transition_to(Suspended));
        assert!(Running.can_transition_to(Finished));
        assert!(Suspended.can_transition_to(Ready));
    }

    #[test]
    fn test_forbidden_transitions() {
        use TaskStatus::*;
        assert!(!Ready.can_transition_to(Suspended));
        assert!(!Ready.can_transition_to(Finished));
        assert!(!Suspended.can_transition_to(Running));
        assert!(!Suspended.can_transition_to(Finished));
        for next in [Ready, Running, Suspended, Finished] {
            assert!(!Finished.can_transition_to(next));
        }
    }

    #[test]
    fn test_new_descriptor_starts_ready() {
        let task = descriptor(&["x new 4"]);
        assert_eq!(task.status(), TaskStatus::Ready);
        assert_eq!(task.start_time(), 2);
        assert_eq!(task.name(), "demo");
        assert!(task.is_source_open());
        assert!(!task.aborted());
        assert_eq!(task.pagination().initial_bytes_allocated, 28672);
    }

    #[test]
    fn test_rejected_descriptor() {
        let task = TaskDescriptor::rejected(TaskSlot::new(1), "broken", "no such file");
        assert!(task.is_finished());
        assert!(task.aborted());
        assert!(!task.succeeded());
        assert!(!task.is_source_open());
        assert_eq!(task.rejection(), Some("no such file"));
    }

    #[test]
    fn test_release_drops_source_once() {
        let mut task = Task::new("demo", Box::new(ScriptSource::new(["read disk"])));
        assert!(task.release());
        assert!(!task.release());
        assert_eq!(task.next_line().unwrap(), None);
    }

    #[test]
    fn test_bounded_list_capacity() {
        let mut list = BoundedList::with_capacity(2);
        assert_eq!(list.try_push(1), Ok(()));
        assert_eq!(list.try_push(2), Ok(()));
        assert!(list.is_full());
        assert_eq!(list.try_push(3), Err(3));
        assert_eq!(list.as_slice(), &[1, 2]);
    }

    #[test]
    fn test_variable_lookup() {
        let mut task = descriptor(&[]);
        task.variables
            .try_push(Variable {
                name: "x".to_string(),
                size: 50,
                logical: ByteRange::new(1, 50),
                physical: ByteRange::new(28673, 28722),
            })
            .unwrap();
        assert_eq!(task.variable("x").map(|v| v.size), Some(50));
        assert!(task.variable("y").is_none());
    }
}
