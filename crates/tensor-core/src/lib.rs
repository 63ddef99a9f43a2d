// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tensor-core
//!
//! Element types, shapes and borrowed tensor views for a bounded-memory
//! inference runtime.
//!
//! This crate provides:
//! - [`DType`] — supported element data types (f32, i32, u8, i8).
//! - [`Shape`] — owned shape descriptors used while building and validating
//!   a model, and [`Dims`], a fixed-rank `Copy` shape for the hot path.
//! - [`TensorView`] / [`TensorViewMut`] — typed views over raw byte buffers
//!   (arena regions or constant data embedded in a model descriptor).
//! - Reference kernels: [`fully_connected`] and [`relu`] with fused
//!   [`Activation`]s.
//!
//! # Design Goals
//! - No heap allocation in kernels: they read from and write into borrowed
//!   byte slices.
//! - No `unsafe`: element access goes through little-endian byte decoding,
//!   so buffers never need `f32` alignment.
//! - Clean error types via `thiserror`.

mod dtype;
mod error;
mod ops;
mod shape;
mod tensor;

pub use dtype::DType;
pub use error::TensorError;
pub use ops::{fully_connected, relu, Activation};
pub use shape::{Dims, Shape, MAX_RANK};
pub use tensor::{TensorView, TensorViewMut};
