//! Suspension monitor

use crate::queue::ReadyQueue;
use crate::task::{TaskDescriptor, TaskStatus};
use core_types::TaskSlot;

/// Counts down every suspended task by `elapsed` time units
///
/// Tasks whose suspension reaches zero become READY and are enqueued in slot
/// order. Returns the slots that resumed.
pub fn tick_suspended(
    tasks: &mut [TaskDescriptor],
    ready: &mut ReadyQueue,
    elapsed: u64,
) -> Vec<TaskSlot> {
    let mut resumed = Vec::new();

    for task in tasks
        .iter_mut()
        .filter(|task| task.status() == TaskStatus::Suspended)
    {
        task.suspended_time = task.suspended_time.saturating_sub(elapsed);
        if task.suspended_time == 0 {
            task.set_status(TaskStatus::Ready);
            ready.enqueue(task.slot());
            resumed.push(task.slot());
        }
    }

    resumed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ScriptSource;
    use crate::task::Task;
    use paging::Pagination;

    fn suspended(slot: usize, remaining: u64) -> TaskDescriptor {
        let mut task = TaskDescriptor::new(
            TaskSlot::new(slot),
            Task::new("s", Box::new(ScriptSource::default())),
            Pagination::default(),
            10,
            64,
        );
        task.set_status(TaskStatus::Running);
        task.set_status(TaskStatus::Suspended);
        task.suspended_time = remaining;
        task
    }

    #[test]
    fn test_countdown_without_resume() {
        let mut tasks = vec![suspended(0, 5)];
        let mut ready = ReadyQueue::new();

        let resumed = tick_suspended(&mut tasks, &mut ready, 3);
        assert!(resumed.is_empty());
        assert_eq!(tasks[0].suspended_time(), 2);
        assert_eq!(tasks[0].status(), TaskStatus::Suspended);
        assert!(ready.is_empty());
    }

    #[test]
    fn test_saturating_resume() {
        let mut tasks = vec![suspended(0, 2), suspended(1, 3), suspended(2, 4)];
        let mut ready = ReadyQueue::new();

        let resumed = tick_suspended(&mut tasks, &mut ready, 3);
        assert_eq!(resumed, vec![TaskSlot::new(0), TaskSlot::new(1)]);
        assert_eq!(tasks[0].suspended_time(), 0);
        assert_eq!(tasks[0].status(), TaskStatus::Ready);
        assert_eq!(tasks[2].suspended_time(), 1);
        assert_eq!(ready.dequeue(), Some(TaskSlot::new(0)));
        assert_eq!(ready.dequeue(), Some(TaskSlot::new(1)));
        assert_eq!(ready.dequeue(), None);
    }

    #[test]
    fn test_other_states_untouched() {
        let mut tasks = vec![suspended(0, 5)];
        tasks[0].set_status(TaskStatus::Ready);
        let mut ready = ReadyQueue::new();

        let resumed = tick_suspended(&mut tasks, &mut ready, 3);
        assert!(resumed.is_empty());
        assert_eq!(tasks[0].suspended_time(), 5);
    }
}
