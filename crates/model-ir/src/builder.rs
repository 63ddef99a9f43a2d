// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Programmatic descriptor assembly.

use crate::descriptor::{to_safetensor_dtype, FORMAT_VERSION_KEY, GRAPH_KEY, NAME_KEY};
use crate::{GraphDef, ModelError, OpDef, OpKind, TensorDef, SCHEMA_VERSION};
use std::borrow::Cow;
use std::collections::HashMap;
use tensor_core::{Activation, DType, Shape};

/// Constant data owned by the builder until serialization.
struct ConstantData {
    name: String,
    dtype: DType,
    shape: Vec<usize>,
    data: Vec<u8>,
}

impl safetensors::View for &ConstantData {
    fn dtype(&self) -> safetensors::Dtype {
        to_safetensor_dtype(self.dtype)
    }

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn data(&self) -> Cow<[u8]> {
        Cow::Borrowed(&self.data)
    }

    fn data_len(&self) -> usize {
        self.data.len()
    }
}

/// Builds a descriptor blob tensor by tensor.
///
/// The builder does not validate the graph; validation is the loader's
/// job. It is therefore possible to build descriptors that the engine will
/// reject, which is what tests need.
///
/// # Example
/// ```
/// use model_ir::{DescriptorBuilder, ModelDescriptor};
/// use tensor_core::{Activation, Shape};
///
/// let mut b = DescriptorBuilder::new("double");
/// let x = b.activation("x", Shape::matrix(1, 1));
/// let w = b.constant_f32("w", Shape::matrix(1, 1), &[2.0]).unwrap();
/// let y = b.activation("y", Shape::matrix(1, 1));
/// b.fully_connected(x, w, None, y, Activation::None);
/// b.input(x).output(y);
///
/// let blob = b.build().unwrap();
/// let d = ModelDescriptor::from_bytes(&blob).unwrap();
/// assert_eq!(d.name(), "double");
/// ```
pub struct DescriptorBuilder {
    name: String,
    format_version: u32,
    tensors: Vec<TensorDef>,
    ops: Vec<OpDef>,
    inputs: Vec<usize>,
    outputs: Vec<usize>,
    constants: Vec<ConstantData>,
}

impl DescriptorBuilder {
    /// Starts an empty descriptor stamped with [`SCHEMA_VERSION`].
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            format_version: SCHEMA_VERSION,
            tensors: Vec::new(),
            ops: Vec::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            constants: Vec::new(),
        }
    }

    /// Overrides the format version written into the blob.
    pub fn set_format_version(&mut self, version: u32) -> &mut Self {
        self.format_version = version;
        self
    }

    /// Declares an `f32` activation and returns its index.
    pub fn activation(&mut self, name: impl Into<String>, shape: Shape) -> usize {
        self.tensors.push(TensorDef::activation(name, shape));
        self.tensors.len() - 1
    }

    /// Declares an `f32` constant with the given values and returns its
    /// index.
    pub fn constant_f32(
        &mut self,
        name: impl Into<String>,
        shape: Shape,
        values: &[f32],
    ) -> Result<usize, ModelError> {
        let name = name.into();
        if shape.checked_num_elements() != Some(values.len()) {
            return Err(ModelError::InvalidTensor {
                tensor: name,
                detail: format!("{} values supplied for shape {shape}", values.len()),
            });
        }
        self.constants.push(ConstantData {
            name: name.clone(),
            dtype: DType::F32,
            shape: shape.dims().to_vec(),
            data: values.iter().flat_map(|v| v.to_le_bytes()).collect(),
        });
        self.tensors.push(TensorDef::constant(name, shape));
        Ok(self.tensors.len() - 1)
    }

    /// Appends an op in execution order and returns its index.
    pub fn op(&mut self, kind: OpKind, inputs: &[usize], outputs: &[usize]) -> usize {
        self.ops
            .push(OpDef::new(kind, inputs.to_vec(), outputs.to_vec()));
        self.ops.len() - 1
    }

    /// Appends a fully connected op.
    pub fn fully_connected(
        &mut self,
        input: usize,
        weights: usize,
        bias: Option<usize>,
        output: usize,
        activation: Activation,
    ) -> usize {
        let mut inputs = vec![input, weights];
        inputs.extend(bias);
        self.op(OpKind::FullyConnected { activation }, &inputs, &[output])
    }

    /// Marks a tensor as a graph input.
    pub fn input(&mut self, tensor: usize) -> &mut Self {
        self.inputs.push(tensor);
        self
    }

    /// Marks a tensor as a graph output.
    pub fn output(&mut self, tensor: usize) -> &mut Self {
        self.outputs.push(tensor);
        self
    }

    /// Returns the graph assembled so far.
    pub fn graph(&self) -> GraphDef {
        GraphDef::new(
            self.tensors.clone(),
            self.ops.clone(),
            self.inputs.clone(),
            self.outputs.clone(),
        )
    }

    /// Serializes the descriptor blob.
    pub fn build(&self) -> Result<Vec<u8>, ModelError> {
        let graph_json = serde_json::to_string(&self.graph())?;
        let metadata = HashMap::from([
            (FORMAT_VERSION_KEY.to_string(), self.format_version.to_string()),
            (NAME_KEY.to_string(), self.name.clone()),
            (GRAPH_KEY.to_string(), graph_json),
        ]);

        let blob = safetensors::serialize(
            self.constants.iter().map(|c| (c.name.as_str(), c)),
            &Some(metadata),
        )
        .map_err(|e| ModelError::SafeTensorsError(e.to_string()))?;

        tracing::debug!(
            "built descriptor '{}' v{}: {} tensors, {} ops, {} bytes",
            self.name,
            self.format_version,
            self.tensors.len(),
            self.ops.len(),
            blob.len()
        );
        Ok(blob)
    }
}
