// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for arena allocation and access.

use crate::ArenaRegion;

/// Errors that can occur while carving or accessing the arena.
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    /// The requested allocation does not fit between head and tail.
    #[error("arena exhausted: requested {requested_bytes} bytes, but only {available_bytes} available (capacity: {capacity_bytes})")]
    Exhausted {
        requested_bytes: usize,
        available_bytes: usize,
        capacity_bytes: usize,
    },

    /// Attempted to allocate a zero-sized buffer.
    #[error("cannot allocate zero-sized buffer")]
    ZeroSizedAllocation,

    /// The arena was sealed after setup; no further allocation is allowed.
    #[error("arena is sealed: no allocation is permitted after setup")]
    Sealed,

    /// A region does not lie inside the arena.
    #[error("region {region} is out of bounds for arena of {capacity_bytes} bytes")]
    OutOfBounds {
        region: ArenaRegion,
        capacity_bytes: usize,
    },

    /// A read region and a write region overlap.
    #[error("regions overlap: read {read}, write {write}")]
    Overlap {
        read: ArenaRegion,
        write: ArenaRegion,
    },

    /// An arena size string could not be interpreted.
    #[error("invalid arena capacity: {0}")]
    InvalidCapacity(String),
}
