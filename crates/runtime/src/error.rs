// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the inference runtime.

use crate::evaluator::EvalError;
use crate::records::RecordError;

/// Errors that can occur while loading, allocating or running a model.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// The descriptor's format version is not the one this engine reads.
    #[error("model provided is schema version {found} not equal to supported version {supported}")]
    SchemaVersionMismatch { found: u32, supported: u32 },

    /// The model's tensors and bookkeeping do not fit the arena.
    #[error("arena exhausted: requested {requested} bytes, {available} available (capacity {capacity}); enlarge the arena")]
    ArenaExhausted {
        requested: usize,
        available: usize,
        capacity: usize,
    },

    /// A single invocation failed. The engine stays usable.
    #[error("invoke failed: {0}")]
    InvokeFailure(#[from] EvalError),

    /// An input or output index beyond what the model declares.
    #[error("{kind} index {index} out of range: model has {count}")]
    TensorIndex {
        kind: &'static str,
        index: usize,
        count: usize,
    },

    /// Attempted to write a tensor that is not a graph input.
    #[error("tensor {tensor} is read-only: only graph inputs are writable")]
    ReadOnlyTensor { tensor: usize },

    /// A handle that does not describe a tensor of this engine.
    #[error("handle for tensor {tensor} does not belong to this engine")]
    StaleHandle { tensor: usize },

    /// Arena bookkeeping could not be decoded.
    #[error("record error: {0}")]
    RecordError(#[from] RecordError),

    /// Accessing a tensor's data failed.
    #[error("tensor error: {0}")]
    TensorError(#[from] tensor_core::TensorError),

    /// Arena access failed.
    #[error("memory error: {0}")]
    MemoryError(#[from] memory_manager::MemoryError),

    /// The arena planner returned an error.
    #[error("planner error: {0}")]
    PlannerError(#[from] arena_planner::PlannerError),

    /// Descriptor parsing or graph validation failed.
    #[error("model error: {0}")]
    ModelError(#[from] model_ir::ModelError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl RuntimeError {
    /// Maps an arena allocation failure to [`RuntimeError::ArenaExhausted`].
    pub(crate) fn from_allocation(err: memory_manager::MemoryError) -> Self {
        match err {
            memory_manager::MemoryError::Exhausted {
                requested_bytes,
                available_bytes,
                capacity_bytes,
            } => RuntimeError::ArenaExhausted {
                requested: requested_bytes,
                available: available_bytes,
                capacity: capacity_bytes,
            },
            other => RuntimeError::MemoryError(other),
        }
    }
}
