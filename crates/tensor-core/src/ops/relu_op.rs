// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Standalone rectified linear unit.

use crate::{DType, TensorError, TensorView, TensorViewMut};

/// Applies `max(0, x)` element-wise.
///
/// # Errors
/// Returns [`TensorError::ShapeMismatch`] if the element counts differ and
/// [`TensorError::UnsupportedDType`] if either side is not `F32`.
pub fn relu(input: &TensorView<'_>, output: &mut TensorViewMut<'_>) -> Result<(), TensorError> {
    for dtype in [input.dtype(), output.dtype()] {
        if dtype != DType::F32 {
            return Err(TensorError::UnsupportedDType { op: "relu", dtype });
        }
    }
    if input.len() != output.len() {
        return Err(TensorError::ShapeMismatch {
            op: "relu",
            lhs: input.dims(),
            rhs: output.dims(),
        });
    }

    for (i, x) in input.iter_f32()?.enumerate() {
        output.set_f32(i, x.max(0.0))?;
    }
    Ok(())
}
