// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Fully connected (dense) layer.

use crate::{Activation, DType, TensorError, TensorView, TensorViewMut};

/// Computes `output = activation(input · weightsᵀ + bias)`.
///
/// Layout follows the usual dense-layer convention:
/// - `weights` is `[out_units, in_units]`.
/// - `input` holds `batches × in_units` elements in any shape.
/// - `bias`, when present, holds `out_units` elements.
/// - `output` holds `batches × out_units` elements.
///
/// # Errors
/// Returns [`TensorError::UnsupportedDType`] for non-`F32` operands,
/// [`TensorError::ShapeMismatch`] for inconsistent sizes and
/// [`TensorError::Numeric`] if any result is not finite.
pub fn fully_connected(
    input: &TensorView<'_>,
    weights: &TensorView<'_>,
    bias: Option<&TensorView<'_>>,
    output: &mut TensorViewMut<'_>,
    activation: Activation,
) -> Result<(), TensorError> {
    for dtype in [input.dtype(), weights.dtype(), output.dtype()]
        .into_iter()
        .chain(bias.map(|b| b.dtype()))
    {
        if dtype != DType::F32 {
            return Err(TensorError::UnsupportedDType {
                op: "fully_connected",
                dtype,
            });
        }
    }

    let w_dims = weights.dims();
    let (out_units, in_units) = match w_dims.as_slice() {
        [o, i] if *i > 0 => (*o, *i),
        _ => {
            return Err(TensorError::ShapeMismatch {
                op: "fully_connected",
                lhs: input.dims(),
                rhs: w_dims,
            })
        }
    };

    if input.len() % in_units != 0 {
        return Err(TensorError::ShapeMismatch {
            op: "fully_connected",
            lhs: input.dims(),
            rhs: w_dims,
        });
    }
    let batches = input.len() / in_units;

    if output.len() != batches * out_units {
        return Err(TensorError::ShapeMismatch {
            op: "fully_connected",
            lhs: w_dims,
            rhs: output.dims(),
        });
    }
    if let Some(b) = bias {
        if b.len() != out_units {
            return Err(TensorError::ShapeMismatch {
                op: "fully_connected",
                lhs: w_dims,
                rhs: b.dims(),
            });
        }
    }

    for batch in 0..batches {
        for o in 0..out_units {
            let mut acc = match bias {
                Some(b) => b.f32_at(o)?,
                None => 0.0,
            };
            for i in 0..in_units {
                acc += input.f32_at(batch * in_units + i)? * weights.f32_at(o * in_units + i)?;
            }
            let value = activation.apply(acc);
            if !value.is_finite() {
                return Err(TensorError::Numeric {
                    op: "fully_connected",
                    detail: format!("non-finite result {value} at unit {o}"),
                });
            }
            output.set_f32(batch * out_units + o, value)?;
        }
    }

    Ok(())
}
