// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # loop-rt
//!
//! Command-line interface for the bounded-memory inference loop.
//!
//! ## Usage
//! ```bash
//! # Drive the built-in sine model through one cycle of 20 steps
//! loop-rt run --ticks 20
//!
//! # Light real LEDs, 50 ms between ticks, until Ctrl-C
//! loop-rt run --sysfs --interval-ms 50
//!
//! # Show the graph, both arena plans and the arena usage
//! loop-rt inspect --arena-size 1K
//!
//! # Write the built-in descriptor to a file
//! loop-rt export --out sine.safetensors
//! ```

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "loop-rt",
    about = "Bounded-memory inference loop for microcontroller-class models",
    version,
    author
)]
struct Cli {
    /// Path to a TOML configuration file; flags given on the command line
    /// override its values.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by commands that build an engine.
#[derive(clap::Args)]
struct EngineArgs {
    /// Descriptor file (defaults to the built-in sine model).
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Arena capacity (e.g., "2K", "512").
    #[arg(short, long)]
    arena_size: Option<String>,

    /// Arena planning strategy: linear, greedy.
    #[arg(short, long)]
    planner: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the inference loop and drive the indicators.
    Run {
        #[command(flatten)]
        engine: EngineArgs,

        /// Ticks per sweep of the input range.
        #[arg(short, long)]
        steps: Option<u32>,

        /// Stop after this many ticks (default: run until Ctrl-C).
        #[arg(short, long)]
        ticks: Option<u64>,

        /// Pause between ticks in milliseconds.
        #[arg(short, long)]
        interval_ms: Option<u64>,

        /// Drive Linux LED class devices instead of the console.
        #[arg(long)]
        sysfs: bool,

        /// LED class root (implies --sysfs).
        #[arg(long)]
        led_root: Option<PathBuf>,
    },

    /// Inspect a descriptor: tensors, ops, arena plans and arena usage.
    Inspect {
        #[command(flatten)]
        engine: EngineArgs,

        /// Print the arena plans as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Write the built-in sine descriptor to a file.
    Export {
        /// Output path.
        #[arg(short, long)]
        out: PathBuf,

        /// Stamp a different format version (to exercise version checks).
        #[arg(long)]
        format_version: Option<u32>,
    },
}

impl EngineArgs {
    fn apply(self, config: &mut runtime::RuntimeConfig) {
        if let Some(model) = self.model {
            config.model_path = Some(model);
        }
        if let Some(size) = self.arena_size {
            config.arena_size = size;
        }
        if let Some(planner) = self.planner {
            config.planner = planner;
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing/logging based on verbosity.
    commands::init_tracing(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => runtime::RuntimeConfig::from_file(path)?,
        None => runtime::RuntimeConfig::default(),
    };

    match cli.command {
        Commands::Run {
            engine,
            steps,
            ticks,
            interval_ms,
            sysfs,
            led_root,
        } => {
            engine.apply(&mut config);
            if let Some(steps) = steps {
                config.steps_per_cycle = steps;
            }
            if ticks.is_some() {
                config.max_ticks = ticks;
            }
            if let Some(ms) = interval_ms {
                config.tick_interval_ms = ms;
            }
            if sysfs || led_root.is_some() {
                config.indicators.backend = runtime::IndicatorBackend::Sysfs;
            }
            if led_root.is_some() {
                config.indicators.led_root = led_root;
            }
            commands::run::execute(config).await
        }
        Commands::Inspect { engine, json } => {
            engine.apply(&mut config);
            commands::inspect::execute(config, json).await
        }
        Commands::Export {
            out,
            format_version,
        } => commands::export::execute(out, format_version).await,
    }
}
