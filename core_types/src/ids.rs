//! Identifiers for simulated entities

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a task in the batch
///
/// The slot is fixed when the batch is built and never reused. It doubles as
/// the task's arrival time and selects its reserved physical region, so two
/// runs over the same batch see the same slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskSlot(usize);

impl TaskSlot {
    /// Creates a slot from a batch index
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the batch index
    pub fn index(&self) -> usize {
        self.0
    }

    /// Returns the batch index widened for time and address arithmetic
    pub fn as_u64(&self) -> u64 {
        self.0 as u64
    }
}

impl fmt::Display for TaskSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Task#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_slot_index() {
        let slot = TaskSlot::new(3);
        assert_eq!(slot.index(), 3);
        assert_eq!(slot.as_u64(), 3);
    }

    #[test]
    fn test_task_slot_ordering() {
        assert!(TaskSlot::new(0) < TaskSlot::new(1));
        assert_eq!(TaskSlot::new(2), TaskSlot::new(2));
    }

    #[test]
    fn test_task_slot_display() {
        let display = format!("{}", TaskSlot::new(1));
        assert_eq!(display, "Task#1");
    }

    #[test]
    fn test_task_slot_serde() {
        let json = serde_json::to_string(&TaskSlot::new(2)).unwrap();
        assert_eq!(json, "2");
        let back: TaskSlot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TaskSlot::new(2));
    }
}
