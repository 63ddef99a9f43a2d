// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Subcommand implementations and shared helpers.

pub mod export;
pub mod inspect;
pub mod run;

use model_ir::ModelFile;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Installs the `fmt` subscriber. `RUST_LOG` wins over `-v`.
pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Descriptor bytes, either memory-mapped from disk or built in.
pub enum ModelSource {
    File(ModelFile),
    Builtin(Vec<u8>),
}

impl ModelSource {
    pub fn open(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => {
                let file = ModelFile::open(path).map_err(|e| {
                    anyhow::anyhow!("failed to open model '{}': {e}", path.display())
                })?;
                Ok(Self::File(file))
            }
            None => Ok(Self::Builtin(model_ir::sine_model()?)),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        match self {
            Self::File(file) => file.bytes(),
            Self::Builtin(bytes) => bytes,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::File(file) => file.path().display().to_string(),
            Self::Builtin(_) => "<built-in sine>".to_string(),
        }
    }
}

/// Prints the framed title used by every command.
pub fn banner(title: &str) {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║ {:^52} ║", title);
    println!("╚══════════════════════════════════════════════════════╝");
    println!();
}
