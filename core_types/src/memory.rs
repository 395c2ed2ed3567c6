//! # Memory Types
//!
//! Address types shared by the paging allocator, the interpreter and the
//! report.
//!
//! ## Design Notes
//!
//! - Addresses are abstract byte numbers; nothing is ever read or written
//! - Ranges are inclusive on both ends
//! - A zero-sized range is representable (`last == first - 1`) and contains
//!   no byte

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of pages needed to hold `bytes`, rounding up
///
/// `page_size` must be non-zero; configurations are validated before use.
pub fn pages_for(bytes: u64, page_size: u64) -> u64 {
    bytes.div_ceil(page_size)
}

/// Inclusive range of bytes `[first, last]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ByteRange {
    pub first: u64,
    pub last: u64,
}

impl ByteRange {
    /// Creates a range from its first and last byte
    pub fn new(first: u64, last: u64) -> Self {
        Self { first, last }
    }

    /// Range of `size` bytes placed right after a high-water mark
    pub fn after(high_water: u64, size: u64) -> Self {
        Self {
            first: high_water.saturating_add(1),
            last: high_water.saturating_add(size),
        }
    }

    /// Returns the number of bytes in the range
    pub fn len(&self) -> u64 {
        self.last.saturating_add(1).saturating_sub(self.first)
    }

    /// Returns true if the range holds no byte
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks if a byte lies inside the range
    pub fn contains(&self, byte: u64) -> bool {
        byte >= self.first && byte <= self.last
    }

    /// Returns the byte at `offset` from the start of the range
    pub fn byte_at(&self, offset: u64) -> u64 {
        self.first.saturating_add(offset)
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.first, self.last)
    }
}

/// A byte address split into page number and offset within the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageAddress {
    pub page: u64,
    pub offset: u64,
}

impl PageAddress {
    /// Splits a byte address using the given page size
    pub fn of(byte: u64, page_size: u64) -> Self {
        Self {
            page: byte / page_size,
            offset: byte % page_size,
        }
    }
}

impl fmt::Display for PageAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.page, self.offset)
    }
}
