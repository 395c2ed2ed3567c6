//! Fixed limits of the simulation
//!
//! These are the defaults; `SimConfig` in `sim_scheduler` can override the
//! scheduling and memory ones for experiments.

/// One unit of time: the cost of a single executed instruction
pub const UT: u64 = 1;

/// Time slice a task may run before it is preempted
pub const QUANTUM: u64 = 2 * UT;

/// Time a task stays suspended after a disk read
pub const SUSPENDED_TIME: u64 = 5;

/// Largest number of tasks accepted on the command line
pub const MAX_TASKS: usize = 4;

/// Largest number of instructions in a task file
pub const MAX_INSTRUCTIONS: usize = 64;

/// Largest number of variables a task may declare
pub const MAX_VARIABLES: usize = 10;

/// Largest number of memory accesses recorded per task
pub const MAX_ACCESSES: usize = MAX_INSTRUCTIONS;

/// Longest instruction line, in characters, excluding the line terminator
pub const MAX_LINE_LENGTH: usize = 127;

/// Total simulated physical memory (64 KiB)
pub const PHYSICAL_MEMORY_TOTAL: u64 = 65536;

/// Largest logical memory a single task may allocate (4 KiB)
pub const LARGEST_LOGICAL_MEMORY_SIZE: u64 = 4096;

/// Size of a logical or physical page
pub const PAGE_SIZE: u64 = 512;

/// Physical memory reserved below the first task region
pub const RESERVED_PROGRAM_MEMORY_SIZE: u64 = 20480;

/// Extension of task instruction files
pub const TASK_FILE_EXTENSION: &str = "tsk";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logical_limit_is_whole_pages() {
        assert_eq!(LARGEST_LOGICAL_MEMORY_SIZE % PAGE_SIZE, 0);
        assert_eq!(LARGEST_LOGICAL_MEMORY_SIZE / PAGE_SIZE, 8);
    }

    #[test]
    fn test_task_regions_fit_in_physical_memory() {
        let end = RESERVED_PROGRAM_MEMORY_SIZE + MAX_TASKS as u64 * LARGEST_LOGICAL_MEMORY_SIZE;
        assert!(end <= PHYSICAL_MEMORY_TOTAL);
    }
}
