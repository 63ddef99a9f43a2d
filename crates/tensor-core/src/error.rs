// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for tensor views and kernels.

use crate::{DType, Dims};

/// Errors that can occur while building tensor views or running kernels.
#[derive(Debug, thiserror::Error)]
pub enum TensorError {
    /// The provided buffer size does not match the expected size for the given shape and dtype.
    #[error("buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    /// Two tensors have incompatible shapes for the requested operation.
    #[error("incompatible shapes for {op}: {lhs} vs {rhs}")]
    ShapeMismatch {
        op: &'static str,
        lhs: Dims,
        rhs: Dims,
    },

    /// The requested data type is not supported for this operation.
    #[error("unsupported dtype {dtype:?} for operation {op}")]
    UnsupportedDType { op: &'static str, dtype: DType },

    /// A shape has more dimensions than the runtime can represent.
    #[error("rank {rank} exceeds the maximum supported rank {max}")]
    RankTooLarge { rank: usize, max: usize },

    /// An element index is outside the tensor.
    #[error("element index {index} out of bounds for {len} elements")]
    IndexOutOfBounds { index: usize, len: usize },

    /// A numeric computation failed (e.g., NaN or overflow).
    #[error("numeric error in {op}: {detail}")]
    Numeric { op: &'static str, detail: String },
}
