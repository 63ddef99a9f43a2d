// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # model-ir
//!
//! The versioned model descriptor and the graph it carries.
//!
//! A descriptor is a single immutable binary blob. The engine reads exactly
//! one thing from it before deciding whether to proceed, the format
//! version, and only then parses the graph:
//!
//! - [`ModelDescriptor`] — zero-copy view over a descriptor blob
//!   (SafeTensors container with string metadata). Constants are borrowed
//!   straight out of the blob.
//! - [`GraphDef`] — tensors, ops, graph inputs and outputs, with a
//!   **type-state pattern** (`Loaded` → `Validated`).
//! - [`DescriptorBuilder`] — assembles descriptors programmatically.
//! - [`ModelFile`] — memory-maps a descriptor file for the hosted path.
//! - [`sine_model`] — the built-in reference descriptor.
//!
//! # Descriptor Format
//! ```text
//! ┌────────────┬──────────────────────────────────────┬───────────────┐
//! │ u64 header │ JSON header                          │ constant data │
//! │ length     │  __metadata__: format_version, name, │ (little-endian│
//! │            │                graph (JSON)          │  tensors)     │
//! │            │  <constant>: dtype, shape, offsets   │               │
//! └────────────┴──────────────────────────────────────┴───────────────┘
//! ```
//!
//! # Example
//! ```
//! use model_ir::{sine_model, ModelDescriptor, SCHEMA_VERSION};
//!
//! let blob = sine_model().unwrap();
//! let descriptor = ModelDescriptor::from_bytes(&blob).unwrap();
//! assert_eq!(descriptor.format_version(), SCHEMA_VERSION);
//!
//! let graph = descriptor.graph().unwrap().validate().unwrap();
//! println!("{}", graph.summary());
//! ```

mod builder;
mod descriptor;
mod error;
pub mod graph;
mod loader;
mod op;
mod sine;
mod tensor_def;

pub use builder::DescriptorBuilder;
pub use descriptor::{ConstantTensor, ModelDescriptor};
pub use error::ModelError;
pub use graph::{GraphDef, TensorLifetime};
pub use loader::ModelFile;
pub use op::{OpDef, OpKind};
pub use sine::{sine_model, sine_model_builder, HIDDEN_UNITS, SINE_X_RANGE};
pub use tensor_def::{TensorDef, TensorKind};

/// The descriptor format version this crate reads and writes.
///
/// A descriptor carrying any other version is rejected before its graph is
/// even parsed.
pub const SCHEMA_VERSION: u32 = 3;

/// Upper bound on the number of tensors in a graph; tensor indices are
/// stored as `u16` in the runtime's node records.
pub const MAX_TENSORS: usize = u16::MAX as usize;

/// Upper bound on a single tensor's byte size; offsets and lengths are
/// stored as `u32` in the runtime's tensor records.
pub const MAX_TENSOR_BYTES: usize = u32::MAX as usize;
