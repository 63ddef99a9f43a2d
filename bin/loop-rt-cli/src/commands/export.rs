// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `loop-rt export` command: write the built-in descriptor to disk.

use std::path::PathBuf;

pub async fn execute(out: PathBuf, format_version: Option<u32>) -> anyhow::Result<()> {
    let mut builder = model_ir::sine_model_builder()?;
    if let Some(version) = format_version {
        builder.set_format_version(version);
    }
    let blob = builder.build()?;

    tokio::fs::write(&out, &blob)
        .await
        .map_err(|e| anyhow::anyhow!("cannot write '{}': {e}", out.display()))?;

    let descriptor = model_ir::ModelDescriptor::from_bytes(&blob)?;
    tracing::info!(
        "wrote '{}' (format v{}, {} B) to {}",
        descriptor.name(),
        descriptor.format_version(),
        blob.len(),
        out.display(),
    );
    Ok(())
}
