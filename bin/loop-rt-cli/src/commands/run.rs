// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `loop-rt run` command: load, allocate, then drive the loop.
//!
//! ```text
//! InferenceEngine<Unloaded> → load → <Loaded> → allocate_tensors → <Allocated>
//!     → CyclicDriver::tick → OutputStateMapper
//! ```

use super::{banner, ModelSource};
use indicator::OutputStateMapper;
use memory_manager::Arena;
use runtime::{CyclicDriver, InferenceEngine, RuntimeConfig, TickOutcome};
use std::time::Duration;

pub async fn execute(config: RuntimeConfig) -> anyhow::Result<()> {
    config.validate()?;
    banner("loop-rt · Inference Loop");

    let source = ModelSource::open(config.model_path.as_deref())?;
    let capacity = config.parse_capacity()?;

    println!("  Config:");
    println!("   Model:     {}", source.describe());
    println!("   Arena:     {capacity}");
    println!("   Planner:   {}", config.planner);
    println!("   Cycle:     {} steps over {:.4}", config.steps_per_cycle, config.x_range);
    println!(
        "   Ticks:     {}",
        config
            .max_ticks
            .map_or_else(|| "until Ctrl-C".to_string(), |n| n.to_string())
    );
    println!("   Indicator: {:?}", config.indicators.backend);
    println!();

    // Load and allocation failures end the run: the arena is fixed, so
    // there is nothing to retry.
    let mut engine = InferenceEngine::new(Arena::new(capacity))
        .with_planner(config.create_planner()?)
        .load(source.bytes())?
        .allocate_tensors()?;
    println!("  Engine ready: {}", engine.arena_stats().summary());
    println!();

    let mut driver = CyclicDriver::new(config.steps_per_cycle, config.x_range)?;
    let mut mapper = OutputStateMapper::new(config.create_indicator_bank());
    let interval = Duration::from_millis(config.tick_interval_ms);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut remaining = config.max_ticks;
    while remaining != Some(0) {
        if let TickOutcome::Skipped { x, error } = driver.tick(&mut engine, &mut mapper) {
            tracing::debug!("tick at x = {x} skipped: {error}");
        }
        if let Some(n) = remaining.as_mut() {
            *n -= 1;
        }

        tokio::select! {
            _ = &mut ctrl_c => {
                tracing::info!("interrupted");
                break;
            }
            _ = tokio::time::sleep(interval) => {}
        }
    }

    println!();
    println!("  {}", driver.metrics().summary());
    if mapper.write_failures() > 0 {
        println!("  Indicator write failures: {}", mapper.write_failures());
    }
    println!();
    Ok(())
}
