//! The per-storage-unit address-space model.

use crate::block::MemoryBlock;
use crate::error::{MemError, MemResult};
use metior_common::DataUnit;
use std::fmt;

/// Models one physical storage unit (e.g. an SRAM) as a sorted,
/// non-overlapping, contiguous sequence of written/free address blocks.
///
/// Invariants, maintained after every mutation:
/// - blocks are sorted by `start` and exactly cover `[0, max_address)`;
/// - adjacent blocks with equal `written` status are merged (canonical
///   form).
///
/// The address width is fixed: a storage unit of `size_bits` with
/// `width_bits`-wide rows exposes `size_bits / width_bits` addresses.
#[derive(Debug, Clone)]
pub struct MemoryModel {
    name: String,
    width_bits: u64,
    size_bits: u64,
    max_address: u64,
    address_map: Vec<MemoryBlock>,
}

impl MemoryModel {
    /// Creates an all-free model for a storage unit.
    pub fn new(name: impl Into<String>, size_bits: u64, width_bits: u64) -> Self {
        debug_assert!(width_bits > 0, "storage width must be non-zero");
        let max_address = size_bits / width_bits;
        Self {
            name: name.into(),
            width_bits,
            size_bits,
            max_address,
            address_map: free_extent(max_address),
        }
    }

    /// The storage unit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Total capacity in bits.
    pub fn size_bits(&self) -> u64 {
        self.size_bits
    }

    /// The row width in bits.
    pub fn width_bits(&self) -> u64 {
        self.width_bits
    }

    /// The exclusive upper address bound.
    pub fn max_address(&self) -> u64 {
        self.max_address
    }

    /// The current address map, canonical and covering the full extent.
    pub fn address_map(&self) -> &[MemoryBlock] {
        &self.address_map
    }

    /// How many bits are currently written.
    pub fn current_bits(&self) -> u64 {
        let addresses: u64 = self
            .address_map
            .iter()
            .filter(|b| b.written)
            .map(MemoryBlock::len)
            .sum();
        addresses * self.width_bits
    }

    /// How many addresses are needed to store `size` of data in `unit`.
    ///
    /// Different widths need different address counts for the same data,
    /// so this is a property of the model, not of the data alone.
    pub fn get_num_address(&self, size: u64, unit: DataUnit) -> u64 {
        unit.to_bits(size).div_ceil(self.width_bits)
    }

    /// How many bits `num_addresses` addresses hold.
    pub fn num_bits(&self, num_addresses: u64) -> u64 {
        self.width_bits * num_addresses
    }

    /// The highest written address, or `None` when nothing is written.
    pub fn get_max_filled_addr(&self) -> Option<u64> {
        self.address_map
            .iter()
            .filter(|b| b.written)
            .map(|b| b.stop - 1)
            .max()
    }

    /// Allocates fresh addresses for `size` of data after the current
    /// maximum written address.
    ///
    /// Returns the `(start, stop)` half-open address range written.
    ///
    /// # Errors
    ///
    /// Returns [`MemError::OutOfMemory`] if the allocation would exceed
    /// the address capacity.
    pub fn allocate_new(&mut self, size: u64, unit: DataUnit) -> MemResult<(u64, u64)> {
        let start = self.get_max_filled_addr().map_or(0, |a| a + 1);
        let count = self.get_num_address(size, unit);
        let stop = start + count;
        if stop > self.max_address {
            return Err(MemError::OutOfMemory {
                needed: stop,
                capacity: self.max_address,
            });
        }
        self.edit_range(start, stop, true)?;
        Ok((start, stop))
    }

    /// Writes `size` of data starting at an explicit address.
    ///
    /// Returns the `(start, stop)` half-open address range written.
    ///
    /// # Errors
    ///
    /// Returns [`MemError::InvalidRange`] if the range falls outside the
    /// model's extent.
    pub fn write_to_address_bits(
        &mut self,
        start_address: u64,
        size: u64,
        unit: DataUnit,
    ) -> MemResult<(u64, u64)> {
        let stop = start_address + self.get_num_address(size, unit);
        self.edit_range(start_address, stop, true)?;
        Ok((start_address, stop))
    }

    /// Writes the explicit address range `[start, stop)`.
    ///
    /// Returns the number of bits written.
    pub fn write_address_range(&mut self, start_address: u64, stop_address: u64) -> MemResult<u64> {
        self.edit_range(start_address, stop_address, true)?;
        Ok((stop_address - start_address) * self.width_bits)
    }

    /// Marks `size` of data free, starting at an address.
    ///
    /// Returns the `(start, stop)` half-open address range freed.
    pub fn delete(&mut self, start_address: u64, size: u64, unit: DataUnit) -> MemResult<(u64, u64)> {
        let stop = start_address + self.get_num_address(size, unit);
        self.edit_range(start_address, stop, false)?;
        Ok((start_address, stop))
    }

    /// Frees the entire model.
    pub fn clear(&mut self) {
        self.address_map = free_extent(self.max_address);
    }

    /// Core address-map edit: marks `[start, stop)` as written or free.
    ///
    /// Binary-searches the sorted map for the blocks holding `start` and
    /// `stop`, partitions those boundary blocks at the exact cut points
    /// (discarding zero-length partitions), splices the edited range in
    /// between the leftovers, and coalesces adjacent equal-status blocks
    /// back to canonical form.
    fn edit_range(&mut self, start: u64, stop: u64, written: bool) -> MemResult<()> {
        if start == stop {
            // Zero-size edits change nothing.
            return Ok(());
        }
        if start > stop || stop > self.max_address {
            return Err(MemError::InvalidRange {
                start,
                stop,
                max_address: self.max_address,
            });
        }

        // Index of the block containing `start`, and of the block whose
        // range the exclusive `stop` cuts into (the one holding stop - 1).
        let start_idx = self.address_map.partition_point(|b| b.stop <= start);
        let stop_idx = self.address_map.partition_point(|b| b.stop < stop);

        let (left_partition, _) = self.address_map[start_idx].partition(start);
        let (_, right_partition) = self.address_map[stop_idx].partition(stop);

        let mut rebuilt = Vec::with_capacity(self.address_map.len() + 2);
        rebuilt.extend_from_slice(&self.address_map[..start_idx]);
        if !left_partition.is_empty() {
            rebuilt.push(left_partition);
        }
        rebuilt.push(MemoryBlock::new(start, stop, written));
        if !right_partition.is_empty() {
            rebuilt.push(right_partition);
        }
        rebuilt.extend_from_slice(&self.address_map[stop_idx + 1..]);
        self.address_map = rebuilt;
        self.coalesce();
        Ok(())
    }

    /// Merges adjacent blocks sharing a written flag into single blocks.
    fn coalesce(&mut self) {
        if self.address_map.len() <= 1 {
            return;
        }
        let mut merged: Vec<MemoryBlock> = Vec::with_capacity(self.address_map.len());
        for block in &self.address_map {
            match merged.last_mut() {
                Some(previous) if previous.written == block.written => {
                    previous.stop = block.stop;
                }
                _ => merged.push(*block),
            }
        }
        self.address_map = merged;
    }
}

/// A single free block over the whole extent; empty for zero capacity.
fn free_extent(max_address: u64) -> Vec<MemoryBlock> {
    if max_address == 0 {
        Vec::new()
    } else {
        vec![MemoryBlock::new(0, max_address, false)]
    }
}

impl fmt::Display for MemoryModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.name)?;
        for block in &self.address_map {
            write!(f, " {block}")?;
        }
        Ok(())
    }
}
