// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for descriptor parsing and graph validation.

/// Errors that can occur when reading or validating a model descriptor.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// The descriptor file could not be opened or mapped.
    #[error("failed to read descriptor '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The SafeTensors container is malformed.
    #[error("failed to parse descriptor container: {0}")]
    SafeTensorsError(String),

    /// A required metadata entry is missing from the descriptor header.
    #[error("descriptor metadata is missing '{key}'")]
    MissingMetadata { key: &'static str },

    /// A metadata entry is present but cannot be interpreted.
    #[error("descriptor metadata '{key}' has invalid value '{value}'")]
    InvalidMetadata { key: &'static str, value: String },

    /// The embedded graph JSON is malformed.
    #[error("failed to parse graph: {0}")]
    GraphParseError(#[from] serde_json::Error),

    /// The graph is structurally invalid.
    #[error("invalid model graph: {0}")]
    InvalidGraph(String),

    /// A tensor definition is invalid.
    #[error("invalid tensor '{tensor}': {detail}")]
    InvalidTensor { tensor: String, detail: String },

    /// An op definition is invalid.
    #[error("invalid op #{op} ({kind}): {detail}")]
    InvalidOp {
        op: usize,
        kind: &'static str,
        detail: String,
    },

    /// A constant tensor declared by the graph is absent from the blob.
    #[error("constant tensor not found: {name}")]
    ConstantNotFound { name: String },

    /// A stored constant disagrees with its declaration.
    #[error("constant tensor '{name}' does not match its declaration: {detail}")]
    ConstantMismatch { name: String, detail: String },
}
