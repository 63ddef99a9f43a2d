// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the arena planner.

/// Errors that can occur during arena planning.
#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    /// The graph has no activation tensors to place.
    #[error("graph has no activation tensors to place")]
    NothingToPlace,

    /// No strategy is registered under the given name.
    #[error("unknown planning strategy '{0}' (expected 'linear' or 'greedy')")]
    UnknownStrategy(String),

    /// Two buffers that are live at the same time share bytes.
    #[error("strategy '{strategy}' placed tensors {first} and {second} in overlapping live ranges")]
    Overlap {
        strategy: String,
        first: usize,
        second: usize,
    },

    /// The chosen strategy produced an inconsistent plan.
    #[error("strategy '{strategy}' failed: {detail}")]
    StrategyFailed { strategy: String, detail: String },
}
