//! Simulation configuration

use core_types::limits::{
    LARGEST_LOGICAL_MEMORY_SIZE, MAX_ACCESSES, MAX_TASKS, MAX_VARIABLES, PAGE_SIZE,
    PHYSICAL_MEMORY_TOTAL, QUANTUM, RESERVED_PROGRAM_MEMORY_SIZE, SUSPENDED_TIME,
};
use paging::PagingLimits;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Quantum must be at least 1 time unit")]
    ZeroQuantum,

    #[error("Page size must be non-zero")]
    ZeroPageSize,

    #[error("Logical memory limit {limit} is not a positive multiple of the page size {page_size}")]
    UnalignedLogicalLimit { limit: u64, page_size: u64 },

    #[error("Physical memory of {total} bytes cannot hold {required} bytes of reserved and task regions")]
    PhysicalMemoryTooSmall { total: u64, required: u64 },
}

/// Simulation configuration
///
/// Defaults reproduce the fixed constants of the simulator. Every field is
/// optional when deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Time units a task may run before it is preempted
    pub quantum: u64,
    /// Time units a disk read keeps a task suspended
    pub suspended_time: u64,
    /// Variables a task may declare
    pub max_variables: usize,
    /// Memory accesses recorded per task
    pub max_accesses: usize,
    /// Size of one page
    pub page_size: u64,
    /// Logical memory a task may allocate
    pub largest_logical_memory: u64,
    /// Physical memory below the first task region
    pub reserved_program_memory: u64,
    /// Total physical memory
    pub physical_memory_total: u64,
    /// Tasks in one batch
    pub max_tasks: usize,
    /// Optional cap on scheduling rounds
    pub max_rounds: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            quantum: QUANTUM,
            suspended_time: SUSPENDED_TIME,
            max_variables: MAX_VARIABLES,
            max_accesses: MAX_ACCESSES,
            page_size: PAGE_SIZE,
            largest_logical_memory: LARGEST_LOGICAL_MEMORY_SIZE,
            reserved_program_memory: RESERVED_PROGRAM_MEMORY_SIZE,
            physical_memory_total: PHYSICAL_MEMORY_TOTAL,
            max_tasks: MAX_TASKS,
            max_rounds: None,
        }
    }
}

impl SimConfig {
    /// Checks that the values describe a consistent machine
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.quantum == 0 {
            return Err(ConfigError::ZeroQuantum);
        }
        if self.page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        if self.largest_logical_memory == 0 || self.largest_logical_memory % self.page_size != 0 {
            return Err(ConfigError::UnalignedLogicalLimit {
                limit: self.largest_logical_memory,
                page_size: self.page_size,
            });
        }

        let required = (self.max_tasks as u64)
            .saturating_mul(self.largest_logical_memory)
            .saturating_add(self.reserved_program_memory);
        if required > self.physical_memory_total {
            return Err(ConfigError::PhysicalMemoryTooSmall {
                total: self.physical_memory_total,
                required,
            });
        }

        Ok(())
    }

    /// Limits handed to the paging allocator
    pub fn paging_limits(&self) -> PagingLimits {
        PagingLimits {
            page_size: self.page_size,
            largest_logical_memory: self.largest_logical_memory,
        }
    }
}
