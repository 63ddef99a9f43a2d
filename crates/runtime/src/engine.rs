// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The inference engine with a type-state lifecycle.
//!
//! ```text
//! InferenceEngine<Unloaded>
//!     │  .load(blob)           checks the schema version, validates the graph
//!     ▼
//! InferenceEngine<Loaded>
//!     │  .allocate_tensors()   plans and carves the arena, then seals it
//!     ▼
//! InferenceEngine<Allocated>
//!     │  .invoke()             repeatable; no heap allocation
//!     ▼
//!   output handle contents
//! ```
//!
//! Each transition consumes the engine. A failed `load` or
//! `allocate_tensors` returns only the error, so nothing is left on which
//! `invoke` could be called.

use crate::evaluator::{EvalContext, Evaluator, ReferenceEvaluator};
use crate::records::{
    encode_io_entry, Node, Storage, Tables, TensorRecord, IO_ENTRY_BYTES, NODE_RECORD_BYTES,
    TENSOR_RECORD_BYTES,
};
use crate::RuntimeError;
use arena_planner::{ArenaPlan, GreedyReuse, PlannerError, PlanningStrategy};
use memory_manager::{Arena, ArenaRegion, ArenaStats};
use model_ir::graph::Validated;
use model_ir::{GraphDef, ModelDescriptor, SCHEMA_VERSION};
use tensor_core::{DType, Dims, TensorView, TensorViewMut};

// ── Type-state markers ─────────────────────────────────────────

/// No model has been loaded.
#[derive(Debug)]
pub struct Unloaded;

/// A descriptor passed the version check and its graph validated.
#[derive(Debug)]
pub struct Loaded {
    name: String,
    graph: GraphDef<Validated>,
    /// `(tensor, blob offset)` for every constant.
    constants: Vec<(usize, usize)>,
}

/// Tensors are placed and the arena is sealed.
#[derive(Debug)]
pub struct Allocated {
    name: String,
    tables: Tables,
    activations: ArenaRegion,
    plan: ArenaPlan,
}

/// Sealed trait for engine states.
pub trait EngineState: std::fmt::Debug {}
impl EngineState for Unloaded {}
impl EngineState for Loaded {}
impl EngineState for Allocated {}

// ── Handles ────────────────────────────────────────────────────

/// A stable reference to one tensor's bytes in the arena.
///
/// Handles are plain values; they stay valid for the life of the engine
/// that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TensorHandle {
    tensor: usize,
    region: ArenaRegion,
}

impl TensorHandle {
    /// Tensor index in the graph.
    pub fn tensor(&self) -> usize {
        self.tensor
    }

    /// Location of the tensor's data in the arena.
    pub fn region(&self) -> ArenaRegion {
        self.region
    }
}

/// Shape and type of a tensor, decoded from its arena record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TensorInfo {
    pub tensor: usize,
    pub dims: Dims,
    pub dtype: DType,
    pub is_input: bool,
    pub is_output: bool,
}

impl TensorInfo {
    pub fn rank(&self) -> usize {
        self.dims.rank()
    }
}

// ── Engine ─────────────────────────────────────────────────────

/// Runs one model inside a fixed-capacity [`Arena`].
///
/// `S` is the lifecycle state and `E` the evaluator that executes the
/// graph on each [`invoke`](InferenceEngine::invoke).
///
/// # Example
/// ```
/// use memory_manager::{Arena, ArenaCapacity};
/// use runtime::InferenceEngine;
///
/// # fn main() -> Result<(), runtime::RuntimeError> {
/// let blob = model_ir::sine_model()?;
/// let mut engine = InferenceEngine::new(Arena::new(ArenaCapacity::default()))
///     .load(&blob)?
///     .allocate_tensors()?;
///
/// let input = engine.input(0)?;
/// engine.tensor_mut(input)?.set_f32(0, 1.0)?;
/// engine.invoke()?;
/// let y = engine.tensor(engine.output(0)?)?.f32_at(0)?;
/// assert!((y - 1.0f32.sin()).abs() < 0.05);
/// # Ok(())
/// # }
/// ```
pub struct InferenceEngine<'a, S: EngineState = Unloaded, E: Evaluator = ReferenceEvaluator> {
    blob: &'a [u8],
    arena: Arena,
    evaluator: E,
    planner: Box<dyn PlanningStrategy>,
    state: S,
}

// ── Unloaded → Loaded ──────────────────────────────────────────

impl<'a> InferenceEngine<'a, Unloaded, ReferenceEvaluator> {
    /// Creates an engine that owns `arena`, using the reference kernels
    /// and greedy buffer reuse.
    pub fn new(arena: Arena) -> Self {
        tracing::info!("engine created with {} byte arena", arena.capacity());
        Self {
            blob: &[],
            arena,
            evaluator: ReferenceEvaluator::new(),
            planner: Box::new(GreedyReuse::new()),
            state: Unloaded,
        }
    }
}

impl<'a, E: Evaluator> InferenceEngine<'a, Unloaded, E> {
    /// Replaces the evaluator.
    pub fn with_evaluator<E2: Evaluator>(self, evaluator: E2) -> InferenceEngine<'a, Unloaded, E2> {
        InferenceEngine {
            blob: self.blob,
            arena: self.arena,
            evaluator,
            planner: self.planner,
            state: Unloaded,
        }
    }

    /// Replaces the arena planning strategy.
    pub fn with_planner(mut self, planner: Box<dyn PlanningStrategy>) -> Self {
        self.planner = planner;
        self
    }

    /// Loads a descriptor blob.
    ///
    /// The format version is checked before anything else is parsed; a
    /// mismatch is reported and ends this engine.
    pub fn load(self, blob: &'a [u8]) -> Result<InferenceEngine<'a, Loaded, E>, RuntimeError> {
        let descriptor = ModelDescriptor::from_bytes(blob)?;
        let found = descriptor.format_version();
        if found != SCHEMA_VERSION {
            tracing::error!(
                "model provided is schema version {found} not equal to supported version {SCHEMA_VERSION}"
            );
            return Err(RuntimeError::SchemaVersionMismatch {
                found,
                supported: SCHEMA_VERSION,
            });
        }

        let graph = descriptor.graph()?.validate()?;
        descriptor.check_constants(&graph)?;
        let constants = graph
            .constants()
            .map(|(index, def)| Ok((index, descriptor.constant(&def.name)?.offset)))
            .collect::<Result<Vec<_>, model_ir::ModelError>>()?;

        let name = descriptor.name().to_string();
        tracing::info!("loaded model '{name}': {}", graph.summary());

        Ok(InferenceEngine {
            blob,
            arena: self.arena,
            evaluator: self.evaluator,
            planner: self.planner,
            state: Loaded {
                name,
                graph,
                constants,
            },
        })
    }
}

// ── Loaded → Allocated ─────────────────────────────────────────

impl<'a, E: Evaluator> InferenceEngine<'a, Loaded, E> {
    /// The validated graph.
    pub fn graph(&self) -> &GraphDef<Validated> {
        &self.state.graph
    }

    /// Model name from the descriptor.
    pub fn name(&self) -> &str {
        &self.state.name
    }

    /// Reserves every buffer the graph needs and seals the arena.
    ///
    /// Bookkeeping tables go to the arena tail, the activation block to
    /// the head. Either failing to fit is [`RuntimeError::ArenaExhausted`].
    pub fn allocate_tensors(self) -> Result<InferenceEngine<'a, Allocated, E>, RuntimeError> {
        let Loaded {
            name,
            graph,
            constants,
        } = self.state;
        let mut arena = self.arena;

        let plan = self.planner.plan(&graph)?;
        plan.validate()?;
        tracing::info!("{}", plan.summary());

        let counts = Tables {
            tensors: ArenaRegion::new(0, 0),
            nodes: ArenaRegion::new(0, 0),
            io: ArenaRegion::new(0, 0),
            num_tensors: graph.num_tensors(),
            num_nodes: graph.num_ops(),
            num_inputs: graph.inputs.len(),
            num_outputs: graph.outputs.len(),
        };
        let (tables, activations) =
            carve(&mut arena, counts, plan.total_bytes).map_err(|e| {
                let err = RuntimeError::from_allocation(e);
                tracing::error!("tensor allocation failed for model '{name}': {err}");
                err
            })?;

        let table = arena.bytes_mut(tables.tensors)?;
        let slots = table.chunks_exact_mut(TENSOR_RECORD_BYTES);
        for ((index, def), slot) in graph.tensors.iter().enumerate().zip(slots) {
            let (storage, offset) = if def.is_constant() {
                let offset = constants
                    .iter()
                    .find(|(tensor, _)| *tensor == index)
                    .map(|&(_, offset)| offset)
                    .ok_or_else(|| model_ir::ModelError::ConstantNotFound {
                        name: def.name.clone(),
                    })?;
                (Storage::Constant, offset)
            } else {
                let alloc = plan.allocation(index).ok_or_else(|| PlannerError::StrategyFailed {
                    strategy: plan.strategy_name.clone(),
                    detail: format!("no buffer for activation '{}'", def.name),
                })?;
                (Storage::Arena, activations.offset() + alloc.offset)
            };
            TensorRecord {
                dtype: def.dtype,
                storage,
                dims: def.shape.to_dims()?,
                is_input: graph.is_input(index),
                is_output: graph.is_output(index),
                offset,
                len: def.size_bytes(),
            }
            .encode(slot, index)?;
        }

        let table = arena.bytes_mut(tables.nodes)?;
        let slots = table.chunks_exact_mut(NODE_RECORD_BYTES);
        for ((index, op), slot) in graph.ops.iter().enumerate().zip(slots) {
            Node::new(index, op.kind, &op.inputs, op.outputs[0])?.encode(slot);
        }

        let table = arena.bytes_mut(tables.io)?;
        let io = graph.inputs.iter().chain(&graph.outputs);
        for ((index, &tensor), slot) in io.enumerate().zip(table.chunks_exact_mut(IO_ENTRY_BYTES)) {
            encode_io_entry(tensor, index, slot)?;
        }

        arena.seal();
        tracing::info!("tensors allocated for '{name}'. {}", arena.stats().summary());

        Ok(InferenceEngine {
            blob: self.blob,
            arena,
            evaluator: self.evaluator,
            planner: self.planner,
            state: Allocated {
                name,
                tables,
                activations,
                plan,
            },
        })
    }
}

/// Reserves the bookkeeping tables at the tail, then the activation block
/// at the head.
fn carve(
    arena: &mut Arena,
    counts: Tables,
    activation_bytes: usize,
) -> Result<(Tables, ArenaRegion), memory_manager::MemoryError> {
    let tensors = arena.allocate_tail(counts.num_tensors * TENSOR_RECORD_BYTES)?;
    let nodes = arena.allocate_tail(counts.num_nodes * NODE_RECORD_BYTES)?;
    let io = arena.allocate_tail((counts.num_inputs + counts.num_outputs) * IO_ENTRY_BYTES)?;
    let activations = arena.allocate_head(activation_bytes)?;
    Ok((
        Tables {
            tensors,
            nodes,
            io,
            ..counts
        },
        activations,
    ))
}

// ── Allocated ──────────────────────────────────────────────────

impl<'a, E: Evaluator> InferenceEngine<'a, Allocated, E> {
    /// Handle to graph input `index`.
    pub fn input(&self, index: usize) -> Result<TensorHandle, RuntimeError> {
        let tables = &self.state.tables;
        let tensor = tables
            .input(&self.arena, index)
            .map_err(|_| RuntimeError::TensorIndex {
                kind: "input",
                index,
                count: tables.num_inputs,
            })?;
        self.handle(tensor)
    }

    /// Handle to graph output `index`.
    pub fn output(&self, index: usize) -> Result<TensorHandle, RuntimeError> {
        let tables = &self.state.tables;
        let tensor = tables
            .output(&self.arena, index)
            .map_err(|_| RuntimeError::TensorIndex {
                kind: "output",
                index,
                count: tables.num_outputs,
            })?;
        self.handle(tensor)
    }

    /// Shape and type of the tensor behind `handle`.
    pub fn info(&self, handle: TensorHandle) -> Result<TensorInfo, RuntimeError> {
        let record = self.record(handle)?;
        Ok(TensorInfo {
            tensor: handle.tensor,
            dims: record.dims,
            dtype: record.dtype,
            is_input: record.is_input,
            is_output: record.is_output,
        })
    }

    /// Read-only view of the tensor behind `handle`.
    pub fn tensor(&self, handle: TensorHandle) -> Result<TensorView<'_>, RuntimeError> {
        let record = self.record(handle)?;
        let data = self.arena.bytes(handle.region)?;
        Ok(TensorView::new(record.dims, record.dtype, data)?)
    }

    /// Writable view of a graph input.
    pub fn tensor_mut(&mut self, handle: TensorHandle) -> Result<TensorViewMut<'_>, RuntimeError> {
        let record = self.record(handle)?;
        if !record.is_input {
            return Err(RuntimeError::ReadOnlyTensor {
                tensor: handle.tensor,
            });
        }
        let data = self.arena.bytes_mut(handle.region)?;
        Ok(TensorViewMut::new(record.dims, record.dtype, data)?)
    }

    /// Runs the graph once on the current input contents.
    pub fn invoke(&mut self) -> Result<(), RuntimeError> {
        let mut ctx = EvalContext::new(&mut self.arena, self.blob, self.state.tables);
        self.evaluator.evaluate(&mut ctx).map_err(|e| {
            tracing::debug!("evaluator '{}' failed: {e}", self.evaluator.name());
            RuntimeError::InvokeFailure(e)
        })
    }

    /// Model name from the descriptor.
    pub fn name(&self) -> &str {
        &self.state.name
    }

    /// The activation placement in use.
    pub fn plan(&self) -> &ArenaPlan {
        &self.state.plan
    }

    /// Where the activation block sits in the arena.
    pub fn activation_region(&self) -> ArenaRegion {
        self.state.activations
    }

    pub fn arena_stats(&self) -> ArenaStats {
        self.arena.stats()
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    fn handle(&self, tensor: usize) -> Result<TensorHandle, RuntimeError> {
        let record = self.state.tables.tensor(&self.arena, tensor)?;
        Ok(TensorHandle {
            tensor,
            region: record.region(),
        })
    }

    fn record(&self, handle: TensorHandle) -> Result<TensorRecord, RuntimeError> {
        let record = self
            .state
            .tables
            .tensor(&self.arena, handle.tensor)
            .map_err(|_| RuntimeError::StaleHandle {
                tensor: handle.tensor,
            })?;
        if record.storage != Storage::Arena || record.region() != handle.region {
            return Err(RuntimeError::StaleHandle {
                tensor: handle.tensor,
            });
        }
        Ok(record)
    }
}

impl<S: EngineState, E: Evaluator> std::fmt::Debug for InferenceEngine<'_, S, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceEngine")
            .field("state", &std::any::type_name::<S>())
            .field("evaluator", &self.evaluator.name())
            .field("planner", &self.planner.name())
            .field("blob_bytes", &self.blob.len())
            .field("arena", &self.arena)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memory_manager::ArenaCapacity;
    use model_ir::sine_model;

    fn engine<'a>() -> InferenceEngine<'a, Unloaded> {
        InferenceEngine::new(Arena::new(ArenaCapacity::default()))
    }

    #[test]
    fn test_allocate_layout() {
        let blob = sine_model().unwrap();
        let engine = engine().load(&blob).unwrap().allocate_tensors().unwrap();

        assert!(engine.arena().is_sealed());
        assert_eq!(engine.activation_region(), ArenaRegion::new(0, 144));
        assert_eq!(engine.plan().strategy_name, "greedy-reuse");
        let stats = engine.arena_stats();
        assert_eq!(stats.head_allocations, 1);
        assert_eq!(stats.tail_allocations, 3);
        assert_eq!(engine.arena().used_bytes(), 144 + 384);
    }

    #[test]
    fn test_handles_are_stable() {
        let blob = sine_model().unwrap();
        let mut engine = engine().load(&blob).unwrap().allocate_tensors().unwrap();

        let input = engine.input(0).unwrap();
        let output = engine.output(0).unwrap();
        assert_eq!(input.tensor(), 0);
        assert_eq!(output.tensor(), 9);

        engine.tensor_mut(input).unwrap().set_f32(0, 2.0).unwrap();
        engine.invoke().unwrap();
        assert_eq!(engine.input(0).unwrap(), input);
        assert_eq!(engine.output(0).unwrap(), output);
        assert_eq!(engine.tensor(input).unwrap().f32_at(0).unwrap(), 2.0);
    }

    #[test]
    fn test_handle_index_out_of_range() {
        let blob = sine_model().unwrap();
        let engine = engine().load(&blob).unwrap().allocate_tensors().unwrap();
        assert!(matches!(
            engine.input(1),
            Err(RuntimeError::TensorIndex {
                kind: "input",
                index: 1,
                count: 1
            })
        ));
        assert!(matches!(
            engine.output(3),
            Err(RuntimeError::TensorIndex { kind: "output", .. })
        ));
    }

    #[test]
    fn test_output_is_read_only() {
        let blob = sine_model().unwrap();
        let mut engine = engine().load(&blob).unwrap().allocate_tensors().unwrap();
        let output = engine.output(0).unwrap();
        assert!(matches!(
            engine.tensor_mut(output),
            Err(RuntimeError::ReadOnlyTensor { tensor: 9 })
        ));
    }

    #[test]
    fn test_stale_handle_rejected() {
        let blob = sine_model().unwrap();
        let engine = engine().load(&blob).unwrap().allocate_tensors().unwrap();
        let forged = TensorHandle {
            tensor: 0,
            region: ArenaRegion::new(1024, 4),
        };
        assert!(matches!(
            engine.info(forged),
            Err(RuntimeError::StaleHandle { tensor: 0 })
        ));
        let missing = TensorHandle {
            tensor: 99,
            region: ArenaRegion::new(0, 4),
        };
        assert!(matches!(engine.tensor(missing), Err(RuntimeError::StaleHandle { .. })));
    }

    #[test]
    fn test_debug_shows_state() {
        let blob = sine_model().unwrap();
        let loaded = engine().load(&blob).unwrap();
        let debug = format!("{loaded:?}");
        assert!(debug.contains("Loaded"));
        assert!(debug.contains("greedy-reuse"));
        assert_eq!(loaded.name(), "sine");
        assert_eq!(loaded.graph().num_ops(), 3);
    }
}
