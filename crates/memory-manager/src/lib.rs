// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # memory-manager
//!
//! A fixed-capacity bump arena for tensor buffers and runtime bookkeeping
//! on memory-constrained devices.
//!
//! # Key Components
//!
//! - [`ArenaCapacity`] — the arena size, with human-readable parsing
//!   (`"2K"`, `"2048"`, `"64KB"`).
//! - [`Arena`] — the allocator: one buffer allocated up front, carved from
//!   both ends, never resized or freed piecewise.
//! - [`ArenaRegion`] — an `(offset, len)` index into the arena. Regions are
//!   plain values, not pointers; all byte access goes back through the
//!   arena with a bounds check.
//! - [`ArenaStats`] — allocation counters and byte totals.
//!
//! # Layout
//!
//! ```text
//!  offset 0                                              capacity
//!  ┌──────────────────────┬───────────────┬──────────────────────┐
//!  │ head: activations ──►│     free      │◄── tail: bookkeeping │
//!  └──────────────────────┴───────────────┴──────────────────────┘
//! ```
//!
//! Once setup is complete the arena is [sealed](Arena::seal); every later
//! allocation attempt fails with [`MemoryError::Sealed`], so "no allocation
//! after setup" is enforced rather than assumed.
//!
//! # Example
//! ```
//! use memory_manager::{Arena, ArenaCapacity};
//!
//! let mut arena = Arena::new(ArenaCapacity::from_kb(2));
//! let records = arena.allocate_tail(64).unwrap();
//! let block = arena.allocate_head(144).unwrap();
//! assert_eq!(arena.used_bytes(), 64 + 144);
//!
//! arena.seal();
//! assert!(arena.allocate_head(16).is_err());
//! # let _ = (records, block);
//! ```

mod arena;
mod capacity;
mod error;
mod region;
mod stats;

pub use arena::{align_up, Arena, ArenaReader, ARENA_ALIGNMENT};
pub use capacity::ArenaCapacity;
pub use error::MemoryError;
pub use region::ArenaRegion;
pub use stats::ArenaStats;
