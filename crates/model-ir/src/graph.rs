// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Graph definition: tensors, ops and the graph's boundary.
//!
//! # Type-State Pattern
//!
//! The graph transitions through states enforced at compile time:
//!
//! ```text
//! GraphDef<Loaded>     — parsed from the descriptor, not yet checked.
//!       │  .validate()
//!       ▼
//! GraphDef<Validated>  — indices, arity, ordering and shapes verified.
//! ```
//!
//! Only a validated graph can be planned or loaded into the engine. The
//! transition consumes the old state, so a graph that failed validation
//! is gone rather than left half-usable.

use crate::{ModelError, OpDef, OpKind, TensorDef, TensorKind, MAX_TENSORS, MAX_TENSOR_BYTES};
use std::fmt;
use std::marker::PhantomData;
use tensor_core::{DType, MAX_RANK};

// ── Type-state markers ─────────────────────────────────────────────

/// Marker: graph has been parsed but not validated.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded;

/// Marker: graph has been validated and can be executed.
#[derive(Debug, Clone, PartialEq)]
pub struct Validated;

/// Sealed trait for graph states.
pub trait GraphState: fmt::Debug + Clone + PartialEq {}
impl GraphState for Loaded {}
impl GraphState for Validated {}

// ── GraphDef ───────────────────────────────────────────────────────

/// The computation graph stored in a descriptor.
///
/// Ops are listed in execution order. Tensors are referred to by their
/// index in `tensors`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(bound = "")]
pub struct GraphDef<S: GraphState = Loaded> {
    /// Every tensor the graph touches, constants included.
    pub tensors: Vec<TensorDef>,
    /// Ops in execution order.
    pub ops: Vec<OpDef>,
    /// Tensors the caller writes before each invocation.
    pub inputs: Vec<usize>,
    /// Tensors the caller reads after each invocation.
    pub outputs: Vec<usize>,
    #[serde(skip)]
    _state: PhantomData<S>,
}

/// The span of ops during which an activation must hold its value.
///
/// Both ends are inclusive op indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct TensorLifetime {
    pub first_op: usize,
    pub last_op: usize,
}

impl TensorLifetime {
    /// Returns `true` if the two spans share at least one op.
    pub fn intersects(&self, other: &TensorLifetime) -> bool {
        self.first_op <= other.last_op && other.first_op <= self.last_op
    }
}

impl<S: GraphState> GraphDef<S> {
    /// Returns `true` if `tensor` is one of the graph inputs.
    pub fn is_input(&self, tensor: usize) -> bool {
        self.inputs.contains(&tensor)
    }

    /// Returns `true` if `tensor` is one of the graph outputs.
    pub fn is_output(&self, tensor: usize) -> bool {
        self.outputs.contains(&tensor)
    }

    /// Returns a tensor definition by index.
    pub fn tensor(&self, index: usize) -> Option<&TensorDef> {
        self.tensors.get(index)
    }
}

// ── Loaded state ───────────────────────────────────────────────────

impl GraphDef<Loaded> {
    /// Creates a new graph in the `Loaded` state.
    pub fn new(
        tensors: Vec<TensorDef>,
        ops: Vec<OpDef>,
        inputs: Vec<usize>,
        outputs: Vec<usize>,
    ) -> Self {
        Self {
            tensors,
            ops,
            inputs,
            outputs,
            _state: PhantomData,
        }
    }

    /// Validates the graph and transitions to the `Validated` state.
    ///
    /// # Checks
    /// - At least one op, one input and one output; no more than
    ///   [`MAX_TENSORS`] tensors.
    /// - Every tensor has rank ≤ [`MAX_RANK`] and at least one element.
    /// - Op arity matches the op kind; every operand index is in range.
    /// - Ops never write constants or graph inputs, and every activation is
    ///   written at most once.
    /// - Ops appear in dependency order: an activation is read only after
    ///   it was produced (or if it is a graph input).
    /// - Every activation is either a graph input or produced by an op.
    /// - Graph inputs are activations; graph outputs are produced by an op.
    /// - Operand dtypes and shapes are consistent with the op.
    pub fn validate(self) -> Result<GraphDef<Validated>, ModelError> {
        if self.ops.is_empty() {
            return Err(ModelError::InvalidGraph("graph contains no ops".into()));
        }
        if self.inputs.is_empty() {
            return Err(ModelError::InvalidGraph("graph declares no inputs".into()));
        }
        if self.outputs.is_empty() {
            return Err(ModelError::InvalidGraph("graph declares no outputs".into()));
        }
        if self.tensors.len() > MAX_TENSORS {
            return Err(ModelError::InvalidGraph(format!(
                "graph declares {} tensors, at most {MAX_TENSORS} are supported",
                self.tensors.len()
            )));
        }

        self.check_tensors()?;
        self.check_boundary()?;

        let mut produced = vec![false; self.tensors.len()];
        for (index, op) in self.ops.iter().enumerate() {
            self.check_op(index, op, &produced)?;
            for &out in &op.outputs {
                produced[out] = true;
            }
        }

        for (index, tensor) in self.tensors.iter().enumerate() {
            if tensor.kind == TensorKind::Activation && !produced[index] && !self.is_input(index) {
                return Err(ModelError::InvalidTensor {
                    tensor: tensor.name.clone(),
                    detail: "activation is neither a graph input nor produced by any op".into(),
                });
            }
        }
        for &out in &self.outputs {
            if !produced[out] {
                return Err(ModelError::InvalidGraph(format!(
                    "graph output '{}' is never produced",
                    self.tensors[out].name
                )));
            }
        }

        Ok(GraphDef {
            tensors: self.tensors,
            ops: self.ops,
            inputs: self.inputs,
            outputs: self.outputs,
            _state: PhantomData,
        })
    }

    fn check_tensors(&self) -> Result<(), ModelError> {
        for (index, tensor) in self.tensors.iter().enumerate() {
            let invalid = |detail: String| ModelError::InvalidTensor {
                tensor: tensor.name.clone(),
                detail,
            };
            if tensor.shape.rank() > MAX_RANK {
                return Err(invalid(format!(
                    "rank {} exceeds maximum {MAX_RANK}",
                    tensor.shape.rank()
                )));
            }
            let Some(bytes) = tensor.shape.checked_size_bytes(tensor.dtype) else {
                return Err(invalid("element count overflows".into()));
            };
            if bytes == 0 {
                return Err(invalid("shape has zero elements".into()));
            }
            if bytes > MAX_TENSOR_BYTES {
                return Err(invalid(format!(
                    "{bytes} B exceeds the {MAX_TENSOR_BYTES} B tensor limit"
                )));
            }
            if self.tensors[..index].iter().any(|t| t.name == tensor.name) {
                return Err(invalid("duplicate tensor name".into()));
            }
        }
        Ok(())
    }

    fn check_boundary(&self) -> Result<(), ModelError> {
        for (i, &t) in self.inputs.iter().enumerate() {
            let tensor = self.tensors.get(t).ok_or_else(|| {
                ModelError::InvalidGraph(format!("graph input index {t} is out of range"))
            })?;
            if tensor.kind != TensorKind::Activation {
                return Err(ModelError::InvalidGraph(format!(
                    "graph input '{}' is a constant",
                    tensor.name
                )));
            }
            if self.inputs[..i].contains(&t) {
                return Err(ModelError::InvalidGraph(format!(
                    "graph input '{}' is listed twice",
                    tensor.name
                )));
            }
        }
        for &t in &self.outputs {
            if t >= self.tensors.len() {
                return Err(ModelError::InvalidGraph(format!(
                    "graph output index {t} is out of range"
                )));
            }
        }
        Ok(())
    }

    fn check_op(&self, index: usize, op: &OpDef, produced: &[bool]) -> Result<(), ModelError> {
        let kind = op.kind.as_str();
        let invalid = |detail: String| ModelError::InvalidOp {
            op: index,
            kind,
            detail,
        };

        if !op.kind.input_arity().contains(&op.inputs.len()) {
            return Err(invalid(format!(
                "expected {:?} inputs, got {}",
                op.kind.input_arity(),
                op.inputs.len()
            )));
        }
        if op.outputs.len() != op.kind.output_arity() {
            return Err(invalid(format!(
                "expected {} outputs, got {}",
                op.kind.output_arity(),
                op.outputs.len()
            )));
        }
        if let Some(&t) = op
            .inputs
            .iter()
            .chain(&op.outputs)
            .find(|&&t| t >= self.tensors.len())
        {
            return Err(invalid(format!("tensor index {t} is out of range")));
        }

        for &t in &op.inputs {
            let tensor = &self.tensors[t];
            if tensor.kind == TensorKind::Activation && !produced[t] && !self.is_input(t) {
                return Err(invalid(format!(
                    "reads '{}' before it is produced",
                    tensor.name
                )));
            }
        }
        for &t in &op.outputs {
            let tensor = &self.tensors[t];
            if tensor.kind == TensorKind::Constant {
                return Err(invalid(format!("writes constant '{}'", tensor.name)));
            }
            if self.is_input(t) {
                return Err(invalid(format!("writes graph input '{}'", tensor.name)));
            }
            if produced[t] {
                return Err(invalid(format!("'{}' is written twice", tensor.name)));
            }
        }

        if let Some(&t) = op
            .inputs
            .iter()
            .chain(&op.outputs)
            .find(|&&t| self.tensors[t].dtype != DType::F32)
        {
            return Err(invalid(format!(
                "'{}' has dtype {}, only f32 is supported",
                self.tensors[t].name, self.tensors[t].dtype
            )));
        }

        self.check_op_shapes(op).map_err(invalid)
    }

    fn check_op_shapes(&self, op: &OpDef) -> Result<(), String> {
        let shape = |t: usize| &self.tensors[t].shape;
        let output = shape(op.outputs[0]);
        match op.kind {
            OpKind::FullyConnected { .. } => {
                let input = shape(op.inputs[0]);
                let weights = shape(op.inputs[1]);
                let (out_units, in_units) = match weights.dims() {
                    [o, i] => (*o, *i),
                    _ => return Err(format!("weights must be [out, in], got {weights}")),
                };
                if input.num_elements() % in_units != 0 {
                    return Err(format!(
                        "input {input} is not a multiple of {in_units} input units"
                    ));
                }
                let batches = input.num_elements() / in_units;
                if output.num_elements() != batches * out_units {
                    return Err(format!(
                        "output {output} does not hold {batches} x {out_units} units"
                    ));
                }
                if let Some(&b) = op.inputs.get(2) {
                    if shape(b).num_elements() != out_units {
                        return Err(format!(
                            "bias {} does not hold {out_units} units",
                            shape(b)
                        ));
                    }
                }
            }
            OpKind::Relu => {
                let input = shape(op.inputs[0]);
                if input.num_elements() != output.num_elements() {
                    return Err(format!("input {input} and output {output} differ in size"));
                }
            }
        }
        Ok(())
    }
}

// ── Validated state ────────────────────────────────────────────────

impl GraphDef<Validated> {
    /// Returns the number of tensors.
    pub fn num_tensors(&self) -> usize {
        self.tensors.len()
    }

    /// Returns the number of ops.
    pub fn num_ops(&self) -> usize {
        self.ops.len()
    }

    /// Iterates over constant tensors with their indices.
    pub fn constants(&self) -> impl Iterator<Item = (usize, &TensorDef)> {
        self.tensors.iter().enumerate().filter(|(_, t)| t.is_constant())
    }

    /// Iterates over activation tensors with their indices.
    pub fn activations(&self) -> impl Iterator<Item = (usize, &TensorDef)> {
        self.tensors.iter().enumerate().filter(|(_, t)| !t.is_constant())
    }

    /// Total bytes of constant data referenced by the graph.
    pub fn constant_bytes(&self) -> usize {
        self.constants().map(|(_, t)| t.size_bytes()).sum()
    }

    /// Total bytes of all activations, without any reuse.
    pub fn activation_bytes(&self) -> usize {
        self.activations().map(|(_, t)| t.size_bytes()).sum()
    }

    /// Computes the live span of every tensor. Constants get `None`.
    ///
    /// Graph inputs live from the first op to the last; other activations
    /// from their producer to their last consumer. Graph outputs are kept
    /// alive until the last op so they survive for the caller to read.
    pub fn lifetimes(&self) -> Vec<Option<TensorLifetime>> {
        let last = self.ops.len() - 1;
        let mut spans: Vec<Option<TensorLifetime>> = vec![None; self.tensors.len()];

        for &t in &self.inputs {
            spans[t] = Some(TensorLifetime {
                first_op: 0,
                last_op: last,
            });
        }
        for (index, op) in self.ops.iter().enumerate() {
            for &t in &op.outputs {
                spans[t] = Some(TensorLifetime {
                    first_op: index,
                    last_op: index,
                });
            }
            for &t in &op.inputs {
                if let Some(span) = spans[t].as_mut() {
                    span.last_op = span.last_op.max(index);
                }
            }
        }
        for &t in &self.outputs {
            if let Some(span) = spans[t].as_mut() {
                span.last_op = last;
            }
        }
        spans
    }

    /// Returns a summary string describing the graph.
    pub fn summary(&self) -> String {
        format!(
            "{} ops, {} tensors ({} constants, {} B constant data, {} B activations)",
            self.num_ops(),
            self.num_tensors(),
            self.constants().count(),
            self.constant_bytes(),
            self.activation_bytes(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tensor_core::{Activation, Shape};

    /// x[1,2] → FC(3, relu) → h[1,3] → relu → y[1,3]
    fn small_graph() -> GraphDef<Loaded> {
        GraphDef::new(
            vec![
                TensorDef::activation("x", Shape::matrix(1, 2)),
                TensorDef::constant("w", Shape::matrix(3, 2)),
                TensorDef::constant("b", Shape::vector(3)),
                TensorDef::activation("h", Shape::matrix(1, 3)),
                TensorDef::activation("y", Shape::matrix(1, 3)),
            ],
            vec![
                OpDef::new(
                    OpKind::FullyConnected {
                        activation: Activation::Relu,
                    },
                    vec![0, 1, 2],
                    vec![3],
                ),
                OpDef::new(OpKind::Relu, vec![3], vec![4]),
            ],
            vec![0],
            vec![4],
        )
    }

    fn assert_invalid_op(graph: GraphDef<Loaded>) {
        let err = graph.validate().unwrap_err();
        assert!(matches!(err, ModelError::InvalidOp { .. }), "got {err}");
    }

    #[test]
    fn test_valid_graph() {
        let g = small_graph().validate().unwrap();
        assert_eq!(g.num_ops(), 2);
        assert_eq!(g.num_tensors(), 5);
        assert_eq!(g.constants().count(), 2);
        assert_eq!(g.constant_bytes(), 24 + 12);
        assert_eq!(g.activation_bytes(), 8 + 12 + 12);
    }

    #[test]
    fn test_empty_ops() {
        let mut g = small_graph();
        g.ops.clear();
        assert!(matches!(g.validate(), Err(ModelError::InvalidGraph(_))));
    }

    #[test]
    fn test_no_inputs_or_outputs() {
        let mut g = small_graph();
        g.inputs.clear();
        assert!(matches!(g.validate(), Err(ModelError::InvalidGraph(_))));

        let mut g = small_graph();
        g.outputs.clear();
        assert!(matches!(g.validate(), Err(ModelError::InvalidGraph(_))));
    }

    #[test]
    fn test_rank_too_large() {
        let mut g = small_graph();
        g.tensors[4].shape = Shape::new(vec![1, 1, 1, 1, 3]);
        assert!(matches!(g.validate(), Err(ModelError::InvalidTensor { .. })));
    }

    #[test]
    fn test_zero_elements() {
        let mut g = small_graph();
        g.tensors[3].shape = Shape::matrix(1, 0);
        assert!(matches!(g.validate(), Err(ModelError::InvalidTensor { .. })));
    }

    #[test]
    fn test_element_count_overflow() {
        let mut g = small_graph();
        g.tensors[4].shape = Shape::matrix(1 << 32, 1 << 32);
        match g.validate() {
            Err(ModelError::InvalidTensor { tensor, detail }) => {
                assert_eq!(tensor, "y");
                assert_eq!(detail, "element count overflows");
            }
            other => panic!("expected InvalidTensor, got {other:?}"),
        }
    }

    #[test]
    fn test_tensor_too_large() {
        let mut g = small_graph();
        g.tensors[4].shape = Shape::matrix(1, 1 << 30);
        assert!(matches!(g.validate(), Err(ModelError::InvalidTensor { .. })));
    }

    #[test]
    fn test_duplicate_name() {
        let mut g = small_graph();
        g.tensors[4].name = "h".into();
        assert!(matches!(g.validate(), Err(ModelError::InvalidTensor { .. })));
    }

    #[test]
    fn test_bad_arity() {
        let mut g = small_graph();
        g.ops[1].inputs = vec![3, 3];
        assert_invalid_op(g);
    }

    #[test]
    fn test_index_out_of_range() {
        let mut g = small_graph();
        g.ops[0].inputs[1] = 99;
        assert_invalid_op(g);
    }

    #[test]
    fn test_writes_constant() {
        let mut g = small_graph();
        g.ops[1].outputs = vec![2];
        assert_invalid_op(g);
    }

    #[test]
    fn test_writes_graph_input() {
        let mut g = small_graph();
        g.ops[1].outputs = vec![0];
        assert_invalid_op(g);
    }

    #[test]
    fn test_written_twice() {
        let mut g = small_graph();
        g.ops[1].inputs = vec![0];
        g.ops[1].outputs = vec![3];
        g.tensors[0].shape = Shape::matrix(1, 3);
        g.tensors[1].shape = Shape::matrix(3, 3);
        assert_invalid_op(g);
    }

    #[test]
    fn test_out_of_order() {
        let mut g = small_graph();
        g.ops.swap(0, 1);
        assert_invalid_op(g);
    }

    #[test]
    fn test_unsupported_dtype() {
        let mut g = small_graph();
        g.tensors[1].dtype = DType::I8;
        assert_invalid_op(g);
    }

    #[test]
    fn test_shape_mismatch() {
        let mut g = small_graph();
        g.tensors[2].shape = Shape::vector(4);
        assert_invalid_op(g);

        let mut g = small_graph();
        g.tensors[4].shape = Shape::matrix(1, 2);
        assert_invalid_op(g);
    }

    #[test]
    fn test_constant_input_rejected() {
        let mut g = small_graph();
        g.inputs = vec![1];
        assert!(matches!(g.validate(), Err(ModelError::InvalidGraph(_))));
    }

    #[test]
    fn test_dangling_activation() {
        let mut g = small_graph();
        g.ops.pop();
        g.outputs = vec![3];
        // y is declared but nothing writes it.
        assert!(matches!(g.validate(), Err(ModelError::InvalidTensor { .. })));
    }

    #[test]
    fn test_output_never_produced() {
        let mut g = small_graph();
        g.outputs = vec![0];
        assert!(matches!(g.validate(), Err(ModelError::InvalidGraph(_))));
    }

    #[test]
    fn test_lifetimes() {
        let g = small_graph().validate().unwrap();
        let spans = g.lifetimes();
        assert_eq!(spans[1], None);
        assert_eq!(spans[2], None);
        assert_eq!(
            spans[0],
            Some(TensorLifetime {
                first_op: 0,
                last_op: 1
            })
        );
        assert_eq!(
            spans[3],
            Some(TensorLifetime {
                first_op: 0,
                last_op: 1
            })
        );
        assert_eq!(
            spans[4],
            Some(TensorLifetime {
                first_op: 1,
                last_op: 1
            })
        );
    }

    #[test]
    fn test_lifetime_intersection() {
        let a = TensorLifetime {
            first_op: 0,
            last_op: 1,
        };
        let b = TensorLifetime {
            first_op: 1,
            last_op: 2,
        };
        let c = TensorLifetime {
            first_op: 2,
            last_op: 2,
        };
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert!(c.intersects(&b));
    }

    #[test]
    fn test_json_roundtrip() {
        let g = small_graph();
        let json = serde_json::to_string(&g).unwrap();
        let back: GraphDef<Loaded> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, g);
    }

    #[test]
    fn test_summary() {
        let g = small_graph().validate().unwrap();
        let s = g.summary();
        assert!(s.contains("2 ops"));
        assert!(s.contains("5 tensors"));
    }
}
