// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # runtime
//!
//! Runs a small model inside a fixed-size arena and drives it around a
//! cyclic input sweep.
//!
//! The runtime takes:
//! - A model descriptor blob (see `model-ir`), borrowed for the engine's
//!   lifetime so constant weights are never copied.
//! - An [`Arena`](memory_manager::Arena) of fixed capacity that holds
//!   every activation and all engine bookkeeping.
//! - An [`Evaluator`] that executes the graph on each invoke.
//!
//! # Type-State Pipeline
//! ```text
//! InferenceEngine<Unloaded> → InferenceEngine<Loaded> → InferenceEngine<Allocated>
//! ```
//! Transitions are compile-time checked: `invoke` only exists on an
//! allocated engine.
//!
//! # Loop
//! [`CyclicDriver`] maps its [`InferenceCounter`] to an input value,
//! invokes the engine and hands `(x, y)` to an [`OutputSink`], typically
//! an `indicator::OutputStateMapper`. A failed invoke skips the sink for
//! that tick only.

mod config;
mod driver;
mod engine;
mod error;
mod evaluator;
mod metrics;
mod records;

pub use config::{IndicatorBackend, IndicatorConfig, RuntimeConfig};
pub use driver::{CyclicDriver, InferenceCounter, OutputSink, TickOutcome, MAX_STEPS_PER_CYCLE};
pub use engine::{Allocated, EngineState, InferenceEngine, Loaded, TensorHandle, TensorInfo, Unloaded};
pub use error::RuntimeError;
pub use evaluator::{EvalContext, EvalError, Evaluator, Operands, ReferenceEvaluator};
pub use metrics::LoopMetrics;
pub use records::{Node, RecordError, MAX_NODE_INPUTS};
