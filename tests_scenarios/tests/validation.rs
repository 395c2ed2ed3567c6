//! Task File Validation Tests
//!
//! Validates that broken task files are kept out of the schedule without
//! disturbing the tasks around them.

use sim_scheduler::ScheduleEvent;
use tests_scenarios::{task, TaskDir, TASK_A};

/// Test: A missing file is rejected, the others still run
#[test]
fn test_missing_file_rejected() {
    let dir = TaskDir::new().unwrap();
    dir.write("a", TASK_A).unwrap();

    let outcome = dir.run(&["ghost", "a"]).unwrap();
    let ghost = task(&outcome, "ghost");

    assert!(ghost.is_finished());
    assert!(ghost.aborted());
    assert!(ghost.rejection().unwrap().contains("not found"));
    assert!(task(&outcome, "a").succeeded());
}

/// Test: A rejected task never enters the ready queue
#[test]
fn test_rejected_task_never_dispatched() {
    let dir = TaskDir::new().unwrap();
    dir.write("bad", "x new 1\nwrite disk\n").unwrap();
    dir.write("a", TASK_A).unwrap();

    let outcome = dir.run(&["bad", "a"]).unwrap();
    let bad = task(&outcome, "bad");

    assert!(bad.rejection().unwrap().contains("invalid instruction"));
    assert_eq!(bad.cpu_time(), 0);
    assert!(outcome.audit_log.iter().all(|event| !matches!(
        event,
        ScheduleEvent::TaskDispatched { slot, .. } if *slot == bad.slot()
    )));
}

/// Test: A rejected task still takes its slot
///
/// The task after it gets the second physical region and arrival time 1.
#[test]
fn test_rejected_task_keeps_slot() {
    let dir = TaskDir::new().unwrap();
    dir.write("late", "x new 1\n#T=10\n").unwrap();
    dir.write("a", TASK_A).unwrap();

    let outcome = dir.run(&["late", "a"]).unwrap();
    let a = task(&outcome, "a");

    assert!(task(&outcome, "late").rejection().unwrap().contains("header"));
    assert_eq!(a.start_time(), 1);
    assert_eq!(a.pagination().initial_bytes_allocated, 20480 + 4096);
}

/// Test: Over-long lines and files are rejected
#[test]
fn test_size_limits() {
    let dir = TaskDir::new().unwrap();
    dir.write("wide", &format!("{} new 1\n", "v".repeat(130))).unwrap();
    dir.write("tall", &"read disk\n".repeat(65)).unwrap();

    let outcome = dir.run(&["wide", "tall"]).unwrap();

    assert!(task(&outcome, "wide").rejection().is_some());
    assert!(task(&outcome, "tall").rejection().is_some());
    assert_eq!(outcome.rounds, 0);
}

/// Test: An empty file is valid and finishes at once
#[test]
fn test_empty_file_finishes() {
    let dir = TaskDir::new().unwrap();
    dir.write("empty", "").unwrap();

    let outcome = dir.run(&["empty"]).unwrap();
    let empty = task(&outcome, "empty");

    assert!(empty.succeeded());
    assert_eq!(empty.cpu_time(), 0);
    assert_eq!(outcome.rounds, 1);
}
