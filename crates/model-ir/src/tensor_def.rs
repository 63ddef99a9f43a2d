// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tensor declarations.

use tensor_core::{DType, Shape};

/// Where a tensor's data lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TensorKind {
    /// Read-only data stored in the descriptor (weights, biases).
    Constant,
    /// Data produced at runtime, stored in the arena.
    Activation,
}

/// A single tensor declared by the graph.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TensorDef {
    /// Unique name. Constants are looked up in the descriptor by this name.
    pub name: String,
    /// Declared shape.
    pub shape: Shape,
    /// Element type.
    pub dtype: DType,
    /// Storage class.
    pub kind: TensorKind,
}

impl TensorDef {
    /// Declares an `f32` activation tensor.
    pub fn activation(name: impl Into<String>, shape: impl Into<Shape>) -> Self {
        Self {
            name: name.into(),
            shape: shape.into(),
            dtype: DType::F32,
            kind: TensorKind::Activation,
        }
    }

    /// Declares an `f32` constant tensor.
    pub fn constant(name: impl Into<String>, shape: impl Into<Shape>) -> Self {
        Self {
            name: name.into(),
            shape: shape.into(),
            dtype: DType::F32,
            kind: TensorKind::Constant,
        }
    }

    /// Returns `true` for descriptor-backed tensors.
    pub fn is_constant(&self) -> bool {
        self.kind == TensorKind::Constant
    }

    /// Size of the tensor's data in bytes.
    pub fn size_bytes(&self) -> usize {
        self.shape.size_bytes(self.dtype)
    }

    /// One-line description, e.g. `fc1_w: constant f32 [16, 1] (64 B)`.
    pub fn summary(&self) -> String {
        let kind = match self.kind {
            TensorKind::Constant => "constant",
            TensorKind::Activation => "activation",
        };
        format!(
            "{}: {kind} {} {} ({} B)",
            self.name,
            self.dtype,
            self.shape,
            self.size_bytes()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let a = TensorDef::activation("h1", Shape::matrix(1, 16));
        assert!(!a.is_constant());
        assert_eq!(a.size_bytes(), 64);

        let c = TensorDef::constant("w", Shape::matrix(16, 16));
        assert!(c.is_constant());
        assert_eq!(c.size_bytes(), 1024);
    }

    #[test]
    fn test_serde_roundtrip() {
        let t = TensorDef::constant("fc1_b", Shape::vector(16));
        let json = serde_json::to_string(&t).unwrap();
        assert!(json.contains("\"kind\":\"constant\""));
        assert!(json.contains("\"dtype\":\"f32\""));
        let back: TensorDef = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn test_summary() {
        let t = TensorDef::activation("x", Shape::matrix(1, 1));
        assert_eq!(t.summary(), "x: activation f32 [1, 1] (4 B)");
    }
}
