// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Fixed-capacity bump arena.
//!
//! The [`Arena`] is the only memory the engine uses once a model is
//! running. It:
//!
//! 1. Allocates its buffer exactly once, at construction.
//! 2. Hands out [`ArenaRegion`]s from the head (activations) and the tail
//!    (persistent bookkeeping); an allocation that would make the two ends
//!    cross returns `Err(Exhausted)`.
//! 3. Never frees individual regions. Everything lives as long as the
//!    arena.
//! 4. Can be sealed, after which every allocation fails.
//!
//! # Alignment
//! Every region starts on an [`ARENA_ALIGNMENT`]-byte boundary relative to
//! the arena start. Element access goes through byte decoding, so the
//! alignment is about predictable layout, not about pointer casts.

use crate::{ArenaCapacity, ArenaRegion, ArenaStats, MemoryError};

/// Offset alignment for every region handed out by the arena.
pub const ARENA_ALIGNMENT: usize = 16;

/// A fixed-size byte arena carved from both ends.
///
/// # Example
/// ```
/// use memory_manager::{Arena, ArenaCapacity, ArenaRegion};
///
/// let mut arena = Arena::new(ArenaCapacity::from_bytes(256));
/// let a = arena.allocate_head(10).unwrap();
/// let b = arena.allocate_head(4).unwrap();
/// assert_eq!(a, ArenaRegion::new(0, 10));
/// assert_eq!(b.offset(), 16); // aligned
///
/// let rec = arena.allocate_tail(32).unwrap();
/// assert_eq!(rec.end(), 256);
/// ```
pub struct Arena {
    buffer: Box<[u8]>,
    /// First free byte above the head allocations.
    head: usize,
    /// First used byte of the tail allocations (== capacity when empty).
    tail: usize,
    sealed: bool,
    stats: ArenaStats,
}

impl Arena {
    /// Creates an arena, allocating its whole buffer up front.
    pub fn new(capacity: ArenaCapacity) -> Self {
        let bytes = capacity.as_bytes();
        tracing::debug!("arena created: {capacity}");
        Self {
            buffer: vec![0u8; bytes].into_boxed_slice(),
            head: 0,
            tail: bytes,
            sealed: false,
            stats: ArenaStats::default(),
        }
    }

    /// Total capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Bytes currently carved from either end, padding included.
    pub fn used_bytes(&self) -> usize {
        self.head + (self.capacity() - self.tail)
    }

    /// Bytes still free between head and tail (before alignment).
    pub fn available_bytes(&self) -> usize {
        self.tail - self.head
    }

    /// Returns `true` once [`seal`](Arena::seal) has been called.
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Forbids any further allocation.
    pub fn seal(&mut self) {
        if !self.sealed {
            tracing::debug!("arena sealed: {} of {} bytes used", self.used_bytes(), self.capacity());
        }
        self.sealed = true;
    }

    /// Returns a snapshot of allocation statistics.
    pub fn stats(&self) -> ArenaStats {
        self.stats.clone()
    }

    /// Allocates `size` bytes from the low end of the arena.
    pub fn allocate_head(&mut self, size: usize) -> Result<ArenaRegion, MemoryError> {
        self.check_request(size)?;

        let start = align_up(self.head, ARENA_ALIGNMENT);
        let end = start.checked_add(size);
        match end {
            Some(end) if end <= self.tail => {
                let padding = start - self.head;
                self.head = end;
                self.stats.record_head(size, padding);
                Ok(ArenaRegion::new(start, size))
            }
            _ => Err(self.exhausted(size)),
        }
    }

    /// Allocates `size` bytes from the high end of the arena.
    pub fn allocate_tail(&mut self, size: usize) -> Result<ArenaRegion, MemoryError> {
        self.check_request(size)?;

        let start = self
            .tail
            .checked_sub(size)
            .map(|s| align_down(s, ARENA_ALIGNMENT))
            .filter(|&s| s >= self.head);
        match start {
            Some(start) => {
                let padding = self.tail - start - size;
                self.tail = start;
                self.stats.record_tail(size, padding);
                Ok(ArenaRegion::new(start, size))
            }
            None => Err(self.exhausted(size)),
        }
    }

    /// Resolves a region to a read-only slice.
    pub fn bytes(&self, region: ArenaRegion) -> Result<&[u8], MemoryError> {
        self.check_bounds(region)?;
        Ok(&self.buffer[region.range()])
    }

    /// Resolves a region to a writable slice.
    pub fn bytes_mut(&mut self, region: ArenaRegion) -> Result<&mut [u8], MemoryError> {
        self.check_bounds(region)?;
        Ok(&mut self.buffer[region.range()])
    }

    /// Splits the arena around `write`: the returned slice is the only
    /// writable view, and the [`ArenaReader`] resolves any region that does
    /// not overlap it. This is how a kernel reads its operands while writing
    /// its result in the same arena.
    pub fn split_around(
        &mut self,
        write: ArenaRegion,
    ) -> Result<(ArenaReader<'_>, &mut [u8]), MemoryError> {
        self.check_bounds(write)?;
        let capacity = self.capacity();
        let (lo, rest) = self.buffer.split_at_mut(write.offset());
        let (out, hi) = rest.split_at_mut(write.len());
        Ok((
            ArenaReader {
                lo,
                hi,
                write,
                capacity,
            },
            out,
        ))
    }

    /// Resolves one region for reading and a disjoint one for writing.
    pub fn split(
        &mut self,
        read: ArenaRegion,
        write: ArenaRegion,
    ) -> Result<(&[u8], &mut [u8]), MemoryError> {
        let (reader, out) = self.split_around(write)?;
        Ok((reader.read(read)?, out))
    }

    fn check_request(&mut self, size: usize) -> Result<(), MemoryError> {
        if self.sealed {
            self.stats.record_failure();
            return Err(MemoryError::Sealed);
        }
        if size == 0 {
            return Err(MemoryError::ZeroSizedAllocation);
        }
        Ok(())
    }

    fn check_bounds(&self, region: ArenaRegion) -> Result<(), MemoryError> {
        if region.end() > self.capacity() {
            return Err(MemoryError::OutOfBounds {
                region,
                capacity_bytes: self.capacity(),
            });
        }
        Ok(())
    }

    fn exhausted(&mut self, requested_bytes: usize) -> MemoryError {
        self.stats.record_failure();
        tracing::warn!(
            "arena allocation of {requested_bytes} bytes failed ({} of {} bytes free)",
            self.available_bytes(),
            self.capacity(),
        );
        MemoryError::Exhausted {
            requested_bytes,
            available_bytes: self.available_bytes(),
            capacity_bytes: self.capacity(),
        }
    }
}

/// Read access to everything outside the write region of
/// [`Arena::split_around`].
#[derive(Debug, Clone, Copy)]
pub struct ArenaReader<'b> {
    lo: &'b [u8],
    hi: &'b [u8],
    write: ArenaRegion,
    capacity: usize,
}

impl<'b> ArenaReader<'b> {
    /// Resolves `region`, which must lie entirely before or after the
    /// write region.
    pub fn read(&self, region: ArenaRegion) -> Result<&'b [u8], MemoryError> {
        if region.end() > self.capacity {
            return Err(MemoryError::OutOfBounds {
                region,
                capacity_bytes: self.capacity,
            });
        }
        if region.end() <= self.write.offset() {
            Ok(&self.lo[region.range()])
        } else if region.offset() >= self.write.end() {
            let start = region.offset() - self.write.end();
            Ok(&self.hi[start..start + region.len()])
        } else {
            Err(MemoryError::Overlap {
                read: region,
                write: self.write,
            })
        }
    }
}

impl std::fmt::Debug for Arena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arena")
            .field("capacity", &self.capacity())
            .field("head", &self.head)
            .field("tail", &self.tail)
            .field("sealed", &self.sealed)
            .finish()
    }
}

/// Rounds `value` up to a multiple of `align` (a power of two).
pub fn align_up(value: usize, align: usize) -> usize {
    (value + align - 1) & !(align - 1)
}

/// Rounds `value` down to a multiple of `align` (a power of two).
pub(crate) fn align_down(value: usize, align: usize) -> usize {
    value & !(align - 1)
}
