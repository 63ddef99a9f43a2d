// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Operator declarations.
//!
//! The graph supports exactly the operators the reference evaluator
//! implements. Each op names its operand tensors by index.

use std::ops::RangeInclusive;
use tensor_core::Activation;

/// The computation an op performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OpKind {
    /// Dense layer: `inputs = [x, weights]` or `[x, weights, bias]`.
    FullyConnected {
        #[serde(default)]
        activation: Activation,
    },
    /// Element-wise `max(x, 0)`.
    Relu,
}

impl OpKind {
    /// Returns a human-readable label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullyConnected { .. } => "fully_connected",
            Self::Relu => "relu",
        }
    }

    /// Stable opcode stored in the runtime's node records.
    pub fn code(&self) -> u8 {
        match self {
            Self::FullyConnected { .. } => 1,
            Self::Relu => 2,
        }
    }

    /// Fused activation, if the op carries one.
    pub fn activation(&self) -> Activation {
        match self {
            Self::FullyConnected { activation } => *activation,
            Self::Relu => Activation::None,
        }
    }

    /// Rebuilds an op kind from its record encoding.
    pub fn from_code(code: u8, activation_code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::FullyConnected {
                activation: Activation::from_code(activation_code)?,
            }),
            2 => Some(Self::Relu),
            _ => None,
        }
    }

    /// Accepted number of input operands.
    pub fn input_arity(&self) -> RangeInclusive<usize> {
        match self {
            Self::FullyConnected { .. } => 2..=3,
            Self::Relu => 1..=1,
        }
    }

    /// Required number of output operands.
    pub fn output_arity(&self) -> usize {
        1
    }
}

/// A single op in execution order.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OpDef {
    #[serde(flatten)]
    pub kind: OpKind,
    /// Operand tensor indices.
    pub inputs: Vec<usize>,
    /// Result tensor indices.
    pub outputs: Vec<usize>,
}

impl OpDef {
    /// Creates an op.
    pub fn new(kind: OpKind, inputs: Vec<usize>, outputs: Vec<usize>) -> Self {
        Self {
            kind,
            inputs,
            outputs,
        }
    }

    /// Returns `true` if this op reads `tensor`.
    pub fn reads(&self, tensor: usize) -> bool {
        self.inputs.contains(&tensor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_roundtrip() {
        let fc = OpKind::FullyConnected {
            activation: Activation::Relu,
        };
        assert_eq!(
            OpKind::from_code(fc.code(), fc.activation().code()),
            Some(fc)
        );
        assert_eq!(OpKind::from_code(2, 0), Some(OpKind::Relu));
        assert_eq!(OpKind::from_code(7, 0), None);
        assert_eq!(OpKind::from_code(1, 200), None);
    }

    #[test]
    fn test_arity() {
        let fc = OpKind::FullyConnected {
            activation: Activation::None,
        };
        assert!(fc.input_arity().contains(&2));
        assert!(fc.input_arity().contains(&3));
        assert!(!fc.input_arity().contains(&4));
        assert!(!OpKind::Relu.input_arity().contains(&2));
    }

    #[test]
    fn test_json_format() {
        let json = r#"{"kind":"fully_connected","activation":"relu","inputs":[0,1,2],"outputs":[3]}"#;
        let op: OpDef = serde_json::from_str(json).unwrap();
        assert_eq!(
            op.kind,
            OpKind::FullyConnected {
                activation: Activation::Relu
            }
        );
        assert!(op.reads(1));
        assert!(!op.reads(3));

        let relu: OpDef = serde_json::from_str(r#"{"kind":"relu","inputs":[3],"outputs":[4]}"#).unwrap();
        assert_eq!(relu.kind, OpKind::Relu);
    }

    #[test]
    fn test_activation_defaults_to_none() {
        let op: OpDef =
            serde_json::from_str(r#"{"kind":"fully_connected","inputs":[0,1],"outputs":[2]}"#).unwrap();
        assert_eq!(op.kind.activation(), Activation::None);
    }
}
