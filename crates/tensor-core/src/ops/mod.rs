// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Reference kernels.
//!
//! Each kernel reads from borrowed input views and writes into a
//! pre-allocated output view, so invoking a graph never allocates.

mod activation;
mod fully_connected_op;
mod relu_op;

pub use activation::Activation;
pub use fully_connected_op::fully_connected;
pub use relu_op::relu;
