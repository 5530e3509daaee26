//! Address blocks: contiguous, uniformly written-or-free ranges.

use std::fmt;

/// A half-open address range `[start, stop)` with a written flag.
///
/// Invariant: `start < stop`. Blocks are created only by the memory model,
/// which validates ranges before constructing them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryBlock {
    /// First address of the range (inclusive).
    pub start: u64,
    /// One past the last address of the range (exclusive).
    pub stop: u64,
    /// Whether the range holds written data.
    pub written: bool,
}

impl MemoryBlock {
    /// Creates a block over `[start, stop)`.
    pub fn new(start: u64, stop: u64, written: bool) -> Self {
        debug_assert!(start < stop, "memory block must be non-empty");
        Self {
            start,
            stop,
            written,
        }
    }

    /// The number of addresses in the block.
    pub fn len(&self) -> u64 {
        self.stop - self.start
    }

    /// Whether the block covers no addresses.
    ///
    /// Only [`partition`](Self::partition) leftovers can be empty; blocks
    /// in an address map never are.
    pub fn is_empty(&self) -> bool {
        self.start >= self.stop
    }

    /// Whether the block covers a single address.
    pub fn contains_addr(&self, addr: u64) -> bool {
        self.start <= addr && addr < self.stop
    }

    /// Whether the block fully covers the range `[start, stop)`.
    pub fn contains_range(&self, start: u64, stop: u64) -> bool {
        self.start <= start && stop <= self.stop
    }

    /// Splits the block at an interior address into left and right halves.
    ///
    /// Either half may come back empty (zero-length) when the cut lands on
    /// a block boundary; callers discard empty partitions.
    pub fn partition(&self, at: u64) -> (MemoryBlock, MemoryBlock) {
        let left = MemoryBlock {
            start: self.start,
            stop: at,
            written: self.written,
        };
        let right = MemoryBlock {
            start: at,
            stop: self.stop,
            written: self.written,
        };
        (left, right)
    }
}

impl fmt::Display for MemoryBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{:#x}..{:#x} written={}>",
            self.start, self.stop, self.written
        )
    }
}
