// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Allocation statistics for the arena.
//!
//! [`ArenaStats`] records how the fixed arena was carved: how many bytes
//! went to activations (head) versus bookkeeping (tail), how much was lost
//! to alignment, and how many requests failed. These are the numbers to
//! look at when choosing an arena size.

/// Cumulative statistics about arena usage.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct ArenaStats {
    /// Successful allocations from the head.
    pub head_allocations: u64,
    /// Successful allocations from the tail.
    pub tail_allocations: u64,
    /// Allocation requests that did not fit or hit a sealed arena.
    pub failed_allocations: u64,
    /// Bytes handed out from the head (including alignment padding).
    pub head_bytes: usize,
    /// Bytes handed out from the tail (including alignment padding).
    pub tail_bytes: usize,
    /// Bytes lost to alignment on either end.
    pub padding_bytes: usize,
}

impl ArenaStats {
    /// Total successful allocations.
    pub fn total_allocations(&self) -> u64 {
        self.head_allocations + self.tail_allocations
    }

    /// Total bytes in use.
    pub fn used_bytes(&self) -> usize {
        self.head_bytes + self.tail_bytes
    }

    pub(crate) fn record_head(&mut self, bytes: usize, padding: usize) {
        self.head_allocations += 1;
        self.head_bytes += bytes + padding;
        self.padding_bytes += padding;
    }

    pub(crate) fn record_tail(&mut self, bytes: usize, padding: usize) {
        self.tail_allocations += 1;
        self.tail_bytes += bytes + padding;
        self.padding_bytes += padding;
    }

    pub(crate) fn record_failure(&mut self) {
        self.failed_allocations += 1;
    }

    /// Returns a human-readable summary.
    pub fn summary(&self) -> String {
        format!(
            "Arena: {} B used ({} B activations in {} blocks, {} B bookkeeping in {} blocks, {} B padding), {} failed requests",
            self.used_bytes(),
            self.head_bytes,
            self.head_allocations,
            self.tail_bytes,
            self.tail_allocations,
            self.padding_bytes,
            self.failed_allocations,
        )
    }
}
