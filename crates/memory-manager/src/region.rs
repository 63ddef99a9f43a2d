// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Regions: typed `(offset, len)` indices into the arena.

use std::fmt;
use std::ops::Range;

/// A contiguous byte range inside an [`Arena`](crate::Arena).
///
/// Regions are cheap `Copy` values. They carry no borrow, so the engine can
/// keep them in its bookkeeping for its whole lifetime and resolve them to
/// slices only at the moment of access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ArenaRegion {
    offset: usize,
    len: usize,
}

impl ArenaRegion {
    /// Creates a region covering `len` bytes starting at `offset`.
    pub fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }

    /// First byte of the region.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` for a zero-length region.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// One past the last byte.
    pub fn end(&self) -> usize {
        self.offset + self.len
    }

    /// The byte range, for slicing.
    pub fn range(&self) -> Range<usize> {
        self.offset..self.end()
    }

    /// Returns `true` if the two regions share at least one byte.
    pub fn overlaps(&self, other: &ArenaRegion) -> bool {
        !self.is_empty() && !other.is_empty() && self.offset < other.end() && other.offset < self.end()
    }

    /// Returns the sub-region `[offset, offset + len)` relative to this
    /// region's start, or `None` if it does not fit.
    pub fn subregion(&self, offset: usize, len: usize) -> Option<ArenaRegion> {
        let end = offset.checked_add(len)?;
        if end > self.len {
            return None;
        }
        Some(ArenaRegion::new(self.offset + offset, len))
    }
}

impl fmt::Display for ArenaRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}..{})", self.offset, self.end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_accessors() {
        let r = ArenaRegion::new(16, 32);
        assert_eq!(r.offset(), 16);
        assert_eq!(r.len(), 32);
        assert_eq!(r.end(), 48);
        assert_eq!(r.range(), 16..48);
        assert_eq!(format!("{r}"), "[16..48)");
    }

    #[test]
    fn test_overlaps() {
        let a = ArenaRegion::new(0, 16);
        let b = ArenaRegion::new(16, 16);
        let c = ArenaRegion::new(8, 16);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&b));
        assert!(!a.overlaps(&ArenaRegion::new(4, 0)));
    }

    #[test]
    fn test_subregion() {
        let block = ArenaRegion::new(32, 64);
        assert_eq!(block.subregion(16, 16), Some(ArenaRegion::new(48, 16)));
        assert_eq!(block.subregion(60, 8), None);
        assert_eq!(block.subregion(usize::MAX, 2), None);
    }
}
