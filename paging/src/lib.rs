//! # Paging Allocator
//!
//! Maps the variables a task declares to logical and physical byte ranges.
//!
//! ## Model
//!
//! - Logical and physical addresses are two independent high-water marks.
//!   The logical one starts at 0, the physical one at the task's reserved
//!   base, so tasks never overlap physically.
//! - Allocation is contiguous and never freed; there is no page table
//!   indirection beyond the report's logical-page to physical-page listing.
//! - Every operation is a pure function from the current [`Pagination`] to
//!   a new one. A failed operation leaves the caller's state untouched.
//!
//! ## Example
//!
//! ```
//! use paging::{apply_declaration, apply_header, Pagination, PagingLimits};
//!
//! let limits = PagingLimits::default();
//! let state = Pagination::seeded(20480);
//! let state = apply_header(&state, 100, &limits).unwrap();
//! assert_eq!(state.bytes_allocated, 511);
//!
//! let placement = apply_declaration(&state, 50, &limits).unwrap();
//! assert_eq!(placement.logical.first, 512);
//! assert_eq!(placement.pagination.final_page, 2);
//! ```

use core_types::limits::{LARGEST_LOGICAL_MEMORY_SIZE, PAGE_SIZE};
use core_types::{pages_for, ByteRange, TaskSlot};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Paging errors
///
/// Each one aborts the task that caused it.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum PagingError {
    #[error("Header must come once, before any declaration")]
    HeaderOutOfOrder,

    #[error("Header needs {pages} pages, at most {max_pages} are allowed")]
    TooManyPages { pages: u64, max_pages: u64 },

    #[error("Logical memory exhausted: {requested} more bytes on top of {allocated} exceeds {limit} bytes")]
    LogicalSpaceExhausted {
        requested: u64,
        allocated: u64,
        limit: u64,
    },
}

/// Sizes that bound a task's memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagingLimits {
    /// Size of one logical or physical page
    pub page_size: u64,
    /// Largest logical allocation a task may hold
    pub largest_logical_memory: u64,
}

impl PagingLimits {
    /// Largest logical page count a task may hold
    pub fn max_pages(&self) -> u64 {
        self.largest_logical_memory / self.page_size
    }
}

impl Default for PagingLimits {
    fn default() -> Self {
        Self {
            page_size: PAGE_SIZE,
            largest_logical_memory: LARGEST_LOGICAL_MEMORY_SIZE,
        }
    }
}

/// Allocator state of one task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pagination {
    /// Logical high-water mark
    pub bytes_allocated: u64,
    /// Physical high-water mark, seeded from the reserved base
    pub physical_bytes_allocated: u64,
    /// Reserved physical base of the task
    pub initial_bytes_allocated: u64,
    /// Logical pages in use, `ceil(bytes_allocated / page_size)`
    pub final_page: u64,
    /// Whether a header has been applied
    pub header_applied: bool,
    /// Number of successful declarations
    pub declarations: u64,
}

impl Pagination {
    /// Creates the initial state of a task whose physical region starts at `base`
    pub fn seeded(physical_base: u64) -> Self {
        Self {
            physical_bytes_allocated: physical_base,
            initial_bytes_allocated: physical_base,
            ..Self::default()
        }
    }

    /// Creates the initial state for the task in `slot`
    ///
    /// Regions are laid out one after another above the reserved program
    /// memory, one `largest_logical_memory` apart.
    pub fn for_slot(slot: TaskSlot, reserved: u64, limits: &PagingLimits) -> Self {
        let base = reserved.saturating_add(slot.as_u64().saturating_mul(limits.largest_logical_memory));
        Self::seeded(base)
    }
}

/// Result of a successful declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// State after the declaration
    pub pagination: Pagination,
    /// Logical bytes given to the variable
    pub logical: ByteRange,
    /// Physical bytes given to the variable
    pub physical: ByteRange,
}

/// Applies a `#T=<bytes>` header
///
/// Rounds the declared size up to whole pages and reserves all of it but the
/// last byte, both logically and physically.
pub fn apply_header(
    state: &Pagination,
    declared_bytes: u64,
    limits: &PagingLimits,
) -> Result<Pagination, PagingError> {
    if state.header_applied || state.declarations > 0 {
        return Err(PagingError::HeaderOutOfOrder);
    }

    let final_page = pages_for(declared_bytes, limits.page_size);
    if final_page > limits.max_pages() {
        return Err(PagingError::TooManyPages {
            pages: final_page,
            max_pages: limits.max_pages(),
        });
    }

    let bytes_allocated = final_page.saturating_mul(limits.page_size).saturating_sub(1);
    Ok(Pagination {
        bytes_allocated,
        physical_bytes_allocated: state.physical_bytes_allocated.saturating_add(bytes_allocated),
        final_page,
        header_applied: true,
        ..*state
    })
}

/// Places a variable of `size` bytes right after the current high-water marks
pub fn apply_declaration(
    state: &Pagination,
    size: u64,
    limits: &PagingLimits,
) -> Result<Placement, PagingError> {
    let bytes_allocated = state.bytes_allocated.saturating_add(size);
    if bytes_allocated > limits.largest_logical_memory {
        return Err(PagingError::LogicalSpaceExhausted {
            requested: size,
            allocated: state.bytes_allocated,
            limit: limits.largest_logical_memory,
        });
    }

    let logical = ByteRange::after(state.bytes_allocated, size);
    let physical = ByteRange::after(state.physical_bytes_allocated, size);
    let pagination = Pagination {
        bytes_allocated,
        physical_bytes_allocated: state.physical_bytes_allocated.saturating_add(size),
        final_page: pages_for(bytes_allocated, limits.page_size),
        declarations: state.declarations + 1,
        ..*state
    };

    Ok(Placement {
        pagination,
        logical,
        physical,
    })
}

/// One row of a task's page table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMapping {
    pub logical_page: u64,
    pub logical: ByteRange,
    pub physical_page: u64,
    pub physical: ByteRange,
}

/// Lists the logical-page to physical-page mapping of a task
///
/// Logical page `i` maps to the `i`-th page of the task's physical region.
pub fn page_table(state: &Pagination, limits: &PagingLimits) -> Vec<PageMapping> {
    let page_size = limits.page_size;
    let base_page = state.initial_bytes_allocated / page_size;

    (0..state.final_page)
        .map(|i| {
            let physical_page = base_page + i;
            PageMapping {
                logical_page: i,
                logical: ByteRange::new(i * page_size, (i + 1) * page_size - 1),
                physical_page,
                physical: ByteRange::new(
                    physical_page * page_size,
                    physical_page * page_size + page_size - 1,
                ),
            }
        })
        .collect()
}
