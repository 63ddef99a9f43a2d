// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for indicator hardware access.

/// Errors reported by an [`IndicatorBank`](crate::IndicatorBank).
#[derive(Debug, thiserror::Error)]
pub enum IndicatorError {
    /// The indicator's control file does not exist on this system.
    #[error("indicator path not found: {path}")]
    NotAvailable { path: String },

    /// Writing to an indicator failed.
    #[error("failed to write {path}: {source}")]
    WriteError {
        path: String,
        source: std::io::Error,
    },

    /// Reading an indicator attribute failed.
    #[error("failed to read {path}: {detail}")]
    ReadError { path: String, detail: String },
}
