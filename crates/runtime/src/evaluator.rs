// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Graph evaluation over arena-resident records.
//!
//! An [`Evaluator`] walks the node table and runs one kernel per node.
//! [`EvalContext`] resolves a node's operands to tensor views: activations
//! come from the arena, constants straight from the descriptor blob. The
//! output view is the only writable one, so a kernel cannot clobber its
//! own inputs.

use crate::records::{Node, RecordError, Storage, Tables, MAX_NODE_INPUTS};
use memory_manager::{Arena, MemoryError};
use model_ir::OpKind;
use tensor_core::{TensorError, TensorView, TensorViewMut};

/// Errors raised while evaluating the graph.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    /// A kernel rejected its operands or produced a non-finite value.
    #[error("node {node} ({op}): {source}")]
    Kernel {
        node: usize,
        op: &'static str,
        #[source]
        source: TensorError,
    },

    /// An operand the kernel requires is absent from the node.
    #[error("node operand {index} missing")]
    MissingOperand { index: usize },

    /// A node writes a tensor that is not arena-backed.
    #[error("tensor {tensor} is a constant and cannot be written")]
    ConstantOutput { tensor: usize },

    /// A constant record points outside the descriptor blob.
    #[error("constant tensor {tensor} at {offset}+{len} lies outside the descriptor")]
    ConstantOutOfBounds {
        tensor: usize,
        offset: usize,
        len: usize,
    },

    /// More operands than a node record can hold.
    #[error("{count} operands requested, at most {max} supported")]
    TooManyOperands { count: usize, max: usize },

    #[error("tensor error: {0}")]
    Tensor(#[from] TensorError),

    #[error("memory error: {0}")]
    Memory(#[from] MemoryError),

    #[error("record error: {0}")]
    Record(#[from] RecordError),
}

/// Runs the graph held by an [`EvalContext`].
///
/// Implementations must not allocate on the heap; the engine calls this
/// once per invoke.
pub trait Evaluator {
    /// Human-readable name for logs.
    fn name(&self) -> &str;

    /// Evaluates every node in order.
    fn evaluate(&mut self, ctx: &mut EvalContext<'_>) -> Result<(), EvalError>;
}

/// The operands of one node: up to three read-only inputs and the
/// writable output.
#[derive(Debug)]
pub struct Operands<'o> {
    pub inputs: [Option<TensorView<'o>>; MAX_NODE_INPUTS],
    pub output: TensorViewMut<'o>,
}

impl<'o> Operands<'o> {
    /// Returns input `index`, which the kernel requires.
    pub fn input(&self, index: usize) -> Result<TensorView<'o>, EvalError> {
        self.inputs
            .get(index)
            .copied()
            .flatten()
            .ok_or(EvalError::MissingOperand { index })
    }
}

/// Access to the allocated graph during one evaluation.
pub struct EvalContext<'c> {
    arena: &'c mut Arena,
    blob: &'c [u8],
    tables: Tables,
}

impl<'c> EvalContext<'c> {
    pub(crate) fn new(arena: &'c mut Arena, blob: &'c [u8], tables: Tables) -> Self {
        Self {
            arena,
            blob,
            tables,
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.tables.num_nodes
    }

    /// Decodes node `index` from the node table.
    pub fn node(&self, index: usize) -> Result<Node, EvalError> {
        Ok(self.tables.node(&*self.arena, index)?)
    }

    /// Resolves the operands of `node`.
    pub fn operands(&mut self, node: &Node) -> Result<Operands<'_>, EvalError> {
        let inputs = node.inputs();
        self.operands_for(&inputs[..node.num_inputs()], node.output())
    }

    /// Resolves arbitrary tensors as inputs and `output` as the result.
    ///
    /// Fails with [`MemoryError::Overlap`] when an arena-backed input
    /// shares bytes with the output.
    pub fn operands_for(
        &mut self,
        inputs: &[usize],
        output: usize,
    ) -> Result<Operands<'_>, EvalError> {
        if inputs.len() > MAX_NODE_INPUTS {
            return Err(EvalError::TooManyOperands {
                count: inputs.len(),
                max: MAX_NODE_INPUTS,
            });
        }

        let out_record = self.tables.tensor(&*self.arena, output)?;
        if out_record.storage != Storage::Arena {
            return Err(EvalError::ConstantOutput { tensor: output });
        }
        let mut records = [None; MAX_NODE_INPUTS];
        for (slot, &tensor) in records.iter_mut().zip(inputs) {
            *slot = Some((tensor, self.tables.tensor(&*self.arena, tensor)?));
        }

        let blob = self.blob;
        let (reader, out) = self.arena.split_around(out_record.region())?;
        let mut views = [None; MAX_NODE_INPUTS];
        for (view, entry) in views.iter_mut().zip(records) {
            let Some((tensor, record)) = entry else {
                continue;
            };
            let data = match record.storage {
                Storage::Arena => reader.read(record.region())?,
                Storage::Constant => blob
                    .get(record.offset..record.offset + record.len)
                    .ok_or(EvalError::ConstantOutOfBounds {
                        tensor,
                        offset: record.offset,
                        len: record.len,
                    })?,
            };
            *view = Some(TensorView::new(record.dims, record.dtype, data)?);
        }

        Ok(Operands {
            inputs: views,
            output: TensorViewMut::new(out_record.dims, out_record.dtype, out)?,
        })
    }
}

impl std::fmt::Debug for EvalContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvalContext")
            .field("arena", &self.arena)
            .field("blob_bytes", &self.blob.len())
            .field("tables", &self.tables)
            .finish()
    }
}

/// Evaluates nodes with the `tensor-core` reference kernels.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReferenceEvaluator;

impl ReferenceEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl Evaluator for ReferenceEvaluator {
    fn name(&self) -> &str {
        "reference"
    }

    fn evaluate(&mut self, ctx: &mut EvalContext<'_>) -> Result<(), EvalError> {
        for index in 0..ctx.num_nodes() {
            let node = ctx.node(index)?;
            let mut ops = ctx.operands(&node)?;
            let result = match node.kind {
                OpKind::FullyConnected { activation } => {
                    let input = ops.input(0)?;
                    let weights = ops.input(1)?;
                    let bias = ops.inputs[2];
                    tensor_core::fully_connected(
                        &input,
                        &weights,
                        bias.as_ref(),
                        &mut ops.output,
                        activation,
                    )
                }
                OpKind::Relu => tensor_core::relu(&ops.input(0)?, &mut ops.output),
            };
            result.map_err(|source| EvalError::Kernel {
                node: index,
                op: node.kind.as_str(),
                source,
            })?;
        }
        Ok(())
    }
}
