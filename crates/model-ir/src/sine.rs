// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The built-in sine model.
//!
//! A three-layer dense network that approximates `sin(x)` on `[0, 2π)`.
//! Rather than shipping trained weights, the weights are derived in closed
//! form: the network computes the piecewise-linear interpolant of `sin` on
//! [`HIDDEN_UNITS`] equal segments.
//!
//! ```text
//! x[1,1] ─► FC(16, relu) ─► h1[1,16] ─► FC(16, relu) ─► h2[1,16] ─► FC(1) ─► y[1,1]
//! ```
//!
//! Unit `i` of the first layer computes `relu(x − kᵢ)` for knot
//! `kᵢ = i · 2π/16`. The second layer passes those hinges through
//! unchanged. The output layer weighs hinge `i` by the change of slope at
//! `kᵢ`, which reproduces the interpolant exactly. With a segment width of
//! π/8 the interpolation error stays below 0.02.

use crate::{DescriptorBuilder, ModelError};
use std::f64::consts::TAU;
use tensor_core::{Activation, Shape};

/// Width of each hidden layer (and the number of interpolation segments).
pub const HIDDEN_UNITS: usize = 16;

/// One full period of the modeled function.
pub const SINE_X_RANGE: f32 = std::f32::consts::TAU;

/// Builds the sine descriptor blob.
pub fn sine_model() -> Result<Vec<u8>, ModelError> {
    sine_model_builder()?.build()
}

/// Returns a builder holding the sine model, for callers that want to
/// tweak it (e.g. stamp a different format version) before building.
pub fn sine_model_builder() -> Result<DescriptorBuilder, ModelError> {
    let step = TAU / HIDDEN_UNITS as f64;
    let knots: Vec<f64> = (0..HIDDEN_UNITS).map(|i| i as f64 * step).collect();

    let slopes: Vec<f64> = knots
        .iter()
        .map(|&k| ((k + step).sin() - k.sin()) / step)
        .collect();
    let slope_changes: Vec<f32> = slopes
        .iter()
        .enumerate()
        .map(|(i, &s)| (if i == 0 { s } else { s - slopes[i - 1] }) as f32)
        .collect();

    let fc1_w = vec![1.0f32; HIDDEN_UNITS];
    let fc1_b: Vec<f32> = knots.iter().map(|&k| -k as f32).collect();
    let fc2_w: Vec<f32> = (0..HIDDEN_UNITS * HIDDEN_UNITS)
        .map(|i| if i / HIDDEN_UNITS == i % HIDDEN_UNITS { 1.0 } else { 0.0 })
        .collect();
    let fc2_b = vec![0.0f32; HIDDEN_UNITS];
    // sin(k₀) = 0, so the output bias is zero.
    let fc3_b = [0.0f32];

    let mut b = DescriptorBuilder::new("sine");
    let hidden = Shape::matrix(1, HIDDEN_UNITS);

    let x = b.activation("x", Shape::matrix(1, 1));
    let w1 = b
        .constant_f32("fc1_w", Shape::matrix(HIDDEN_UNITS, 1), &fc1_w)?;
    let b1 = b
        .constant_f32("fc1_b", Shape::vector(HIDDEN_UNITS), &fc1_b)?;
    let h1 = b.activation("h1", hidden.clone());
    let w2 = b
        .constant_f32("fc2_w", Shape::matrix(HIDDEN_UNITS, HIDDEN_UNITS), &fc2_w)?;
    let b2 = b
        .constant_f32("fc2_b", Shape::vector(HIDDEN_UNITS), &fc2_b)?;
    let h2 = b.activation("h2", hidden);
    let w3 = b
        .constant_f32("fc3_w", Shape::matrix(1, HIDDEN_UNITS), &slope_changes)?;
    let b3 = b
        .constant_f32("fc3_b", Shape::vector(1), &fc3_b)?;
    let y = b.activation("y", Shape::matrix(1, 1));

    b.fully_connected(x, w1, Some(b1), h1, Activation::Relu);
    b.fully_connected(h1, w2, Some(b2), h2, Activation::Relu);
    b.fully_connected(h2, w3, Some(b3), y, Activation::None);
    b.input(x).output(y);
    Ok(b)
}
