//! Scenario Tests
//!
//! Runs the reference task files from disk and checks what each task ends
//! up with.

use core_types::ByteRange;
use sim_scheduler::{TaskStatus, TaskViolation};
use tests_scenarios::{task, TaskDir, TASK_A, TASK_B, TASK_C};

/// Test: A task with a header, a declaration, an access and a disk read
///
/// This validates that:
/// 1. The header rounds the logical space up to a page, so `x` starts at 512
/// 2. The disk read adds 5 time units of I/O
/// 3. The task finishes normally
#[test]
fn test_disk_read_task_completes() {
    let dir = TaskDir::new().unwrap();
    dir.write("a", TASK_A).unwrap();

    let outcome = dir.run(&["a"]).unwrap();
    let a = task(&outcome, "a");

    assert_eq!(a.status(), TaskStatus::Finished);
    assert!(!a.aborted());
    assert_eq!(a.cpu_time(), 3);
    assert_eq!(a.input_output_time(), 5);
    assert_eq!(a.variable("x").unwrap().logical, ByteRange::new(512, 561));
    assert_eq!(a.accesses().len(), 1);
}

/// Test: Without a header, the first variable starts at logical byte 1
#[test]
fn test_headerless_task_starts_at_byte_one() {
    let dir = TaskDir::new().unwrap();
    dir.write("a", "x new 50\nx[10]\nread disk\n").unwrap();

    let outcome = dir.run(&["a"]).unwrap();
    let a = task(&outcome, "a");

    assert!(a.succeeded());
    assert_eq!(a.variable("x").unwrap().logical, ByteRange::new(1, 50));
    assert_eq!(a.input_output_time(), 5);
}

/// Test: Declaring the same name twice aborts the task
///
/// This validates that:
/// 1. The task is FINISHED and aborted
/// 2. Its CPU time is not part of the totals
#[test]
fn test_duplicate_declaration_aborts() {
    let dir = TaskDir::new().unwrap();
    dir.write("b", TASK_B).unwrap();

    let outcome = dir.run(&["b"]).unwrap();
    let b = task(&outcome, "b");

    assert_eq!(b.status(), TaskStatus::Finished);
    assert!(b.aborted());
    assert_eq!(
        b.violation(),
        Some(&TaskViolation::AlreadyDeclared {
            name: "y".to_string()
        })
    );
    assert_eq!(outcome.totals.total_cpu_clocks, 0);
    assert_eq!(outcome.totals.total_output_time, 0);
}

/// Test: Accessing offset == size aborts the task
#[test]
fn test_out_of_bounds_access_aborts() {
    let dir = TaskDir::new().unwrap();
    dir.write("c", TASK_C).unwrap();

    let outcome = dir.run(&["c"]).unwrap();
    let c = task(&outcome, "c");

    assert!(c.aborted());
    assert!(matches!(
        c.violation(),
        Some(TaskViolation::OutOfBounds { offset: 5, size: 5, .. })
    ));
}

/// Test: All three together
///
/// This validates that the aborts of B and C leave A exactly as it is when
/// it runs alone.
#[test]
fn test_aborts_do_not_leak_into_other_tasks() {
    let dir = TaskDir::new().unwrap();
    dir.write("a", TASK_A).unwrap();
    dir.write("b", TASK_B).unwrap();
    dir.write("c", TASK_C).unwrap();

    let alone = dir.run(&["a"]).unwrap();
    let mixed = dir.run(&["a", "b", "c"]).unwrap();

    let a_alone = task(&alone, "a");
    let a_mixed = task(&mixed, "a");
    assert_eq!(a_mixed.cpu_time(), a_alone.cpu_time());
    assert_eq!(a_mixed.input_output_time(), a_alone.input_output_time());
    assert_eq!(a_mixed.end_time(), a_alone.end_time());
    assert_eq!(a_mixed.variables(), a_alone.variables());

    assert_eq!(mixed.successful_count(), 1);
    assert_eq!(mixed.totals.total_cpu_clocks, 3);
    assert_eq!(mixed.totals.total_output_time, 5);
}

/// Test: Every task gets its own physical region, by argument position
#[test]
fn test_physical_regions_do_not_overlap() {
    let dir = TaskDir::new().unwrap();
    for name in ["p", "q", "r", "s"] {
        dir.write(name, "#T=4096\nv new 1\n").unwrap();
    }

    let outcome = dir.run(&["p", "q", "r", "s"]).unwrap();
    let mut regions: Vec<(u64, u64)> = outcome
        .tasks
        .iter()
        .map(|task| {
            let pagination = task.pagination();
            (
                pagination.initial_bytes_allocated,
                pagination.physical_bytes_allocated,
            )
        })
        .collect();
    regions.sort();

    for pair in regions.windows(2) {
        assert!(pair[0].1 <= pair[1].0, "{:?} overlaps {:?}", pair[0], pair[1]);
    }
}
