//! Ready queue

use core_types::TaskSlot;
use std::collections::VecDeque;

/// FIFO of tasks eligible to run
///
/// Slots are enqueued at the back and dequeued from the front. A task is
/// enqueued again each time it becomes READY.
#[derive(Debug, Default)]
pub struct ReadyQueue {
    queue: VecDeque<TaskSlot>,
}

impl ReadyQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, slot: TaskSlot) {
        debug_assert!(!self.contains(slot), "{} queued twice", slot);
        self.queue.push_back(slot);
    }

    /// Removes the head of the queue, `None` when empty
    pub fn dequeue(&mut self) -> Option<TaskSlot> {
        self.queue.pop_front()
    }

    pub fn contains(&self, slot: TaskSlot) -> bool {
        self.queue.contains(&slot)
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }
}
