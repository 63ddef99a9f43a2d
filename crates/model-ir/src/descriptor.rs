// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Zero-copy view over a descriptor blob.

use crate::graph::{Loaded, Validated};
use crate::{GraphDef, ModelError, TensorDef};
use safetensors::SafeTensors;
use std::collections::HashMap;
use tensor_core::{DType, Shape};

/// Metadata key holding the decimal format version.
pub(crate) const FORMAT_VERSION_KEY: &str = "format_version";
/// Metadata key holding the model name.
pub(crate) const NAME_KEY: &str = "name";
/// Metadata key holding the graph JSON.
pub(crate) const GRAPH_KEY: &str = "graph";

/// A parsed, borrowed descriptor.
///
/// Parsing reads the container header and the format version only. The
/// graph is parsed on demand by [`graph`](ModelDescriptor::graph), so a
/// caller can reject an incompatible version without touching it.
pub struct ModelDescriptor<'a> {
    bytes: &'a [u8],
    tensors: SafeTensors<'a>,
    metadata: HashMap<String, String>,
    format_version: u32,
}

/// A constant tensor whose data is borrowed from the descriptor blob.
#[derive(Debug, Clone)]
pub struct ConstantTensor<'a> {
    pub dtype: DType,
    pub shape: Shape,
    pub data: &'a [u8],
    /// Position of `data` within the blob.
    pub offset: usize,
}

impl<'a> ModelDescriptor<'a> {
    /// Parses the container header of `bytes`.
    ///
    /// # Errors
    /// [`ModelError::SafeTensorsError`] if the container is malformed;
    /// [`ModelError::MissingMetadata`] / [`ModelError::InvalidMetadata`]
    /// if the format version is absent or not an integer.
    pub fn from_bytes(bytes: &'a [u8]) -> Result<Self, ModelError> {
        let (_, header) = SafeTensors::read_metadata(bytes)
            .map_err(|e| ModelError::SafeTensorsError(e.to_string()))?;
        let metadata = header.metadata().clone().unwrap_or_default();
        let tensors = SafeTensors::deserialize(bytes)
            .map_err(|e| ModelError::SafeTensorsError(e.to_string()))?;

        let raw = metadata
            .get(FORMAT_VERSION_KEY)
            .ok_or(ModelError::MissingMetadata {
                key: FORMAT_VERSION_KEY,
            })?;
        let format_version = raw
            .trim()
            .parse::<u32>()
            .map_err(|_| ModelError::InvalidMetadata {
                key: FORMAT_VERSION_KEY,
                value: raw.clone(),
            })?;

        Ok(Self {
            bytes,
            tensors,
            metadata,
            format_version,
        })
    }

    /// The format version stamped into the descriptor.
    pub fn format_version(&self) -> u32 {
        self.format_version
    }

    /// The model name, or `"unnamed"` if the descriptor carries none.
    pub fn name(&self) -> &str {
        self.metadata
            .get(NAME_KEY)
            .map(String::as_str)
            .unwrap_or("unnamed")
    }

    /// The whole blob.
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Size of the whole blob in bytes.
    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }

    /// Number of constant tensors stored in the blob.
    pub fn num_constants(&self) -> usize {
        self.tensors.len()
    }

    /// Parses the embedded graph definition.
    pub fn graph(&self) -> Result<GraphDef<Loaded>, ModelError> {
        let json = self
            .metadata
            .get(GRAPH_KEY)
            .ok_or(ModelError::MissingMetadata { key: GRAPH_KEY })?;
        Ok(serde_json::from_str(json)?)
    }

    /// Looks up a stored constant by name.
    pub fn constant(&self, name: &str) -> Result<ConstantTensor<'a>, ModelError> {
        let view = self
            .tensors
            .tensor(name)
            .map_err(|_| ModelError::ConstantNotFound {
                name: name.to_string(),
            })?;
        let dtype = convert_safetensor_dtype(view.dtype()).ok_or_else(|| {
            ModelError::ConstantMismatch {
                name: name.to_string(),
                detail: format!("unsupported stored dtype {:?}", view.dtype()),
            }
        })?;
        let data = view.data();
        Ok(ConstantTensor {
            dtype,
            shape: Shape::from(view.shape()),
            data,
            offset: data.as_ptr() as usize - self.bytes.as_ptr() as usize,
        })
    }

    /// Checks that every constant the graph declares is stored with the
    /// declared dtype and shape.
    pub fn check_constants(&self, graph: &GraphDef<Validated>) -> Result<(), ModelError> {
        for (_, def) in graph.constants() {
            self.check_constant(def)?;
        }
        Ok(())
    }

    fn check_constant(&self, def: &TensorDef) -> Result<(), ModelError> {
        let stored = self.constant(&def.name)?;
        if stored.dtype != def.dtype {
            return Err(ModelError::ConstantMismatch {
                name: def.name.clone(),
                detail: format!("declared {}, stored {}", def.dtype, stored.dtype),
            });
        }
        if stored.shape != def.shape {
            return Err(ModelError::ConstantMismatch {
                name: def.name.clone(),
                detail: format!("declared {}, stored {:?}", def.shape, stored.shape),
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for ModelDescriptor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelDescriptor")
            .field("name", &self.name())
            .field("format_version", &self.format_version)
            .field("constants", &self.num_constants())
            .field("size_bytes", &self.size_bytes())
            .finish()
    }
}

/// Converts a SafeTensors `Dtype` to our [`DType`].
pub(crate) fn convert_safetensor_dtype(st_dtype: safetensors::Dtype) -> Option<DType> {
    match st_dtype {
        safetensors::Dtype::F32 => Some(DType::F32),
        safetensors::Dtype::I32 => Some(DType::I32),
        safetensors::Dtype::U8 => Some(DType::U8),
        safetensors::Dtype::I8 => Some(DType::I8),
        _ => None,
    }
}

/// Converts our [`DType`] to a SafeTensors `Dtype`.
pub(crate) fn to_safetensor_dtype(dtype: DType) -> safetensors::Dtype {
    match dtype {
        DType::F32 => safetensors::Dtype::F32,
        DType::I32 => safetensors::Dtype::I32,
        DType::U8 => safetensors::Dtype::U8,
        DType::I8 => safetensors::Dtype::I8,
    }
}
