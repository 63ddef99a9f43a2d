// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `loop-rt inspect` command: descriptor contents, arena plans and the
//! arena footprint at the configured capacity.

use super::{banner, ModelSource};
use arena_planner::{GreedyReuse, Linear, PlanningStrategy};
use memory_manager::Arena;
use model_ir::ModelDescriptor;
use runtime::{InferenceEngine, RuntimeConfig};

pub async fn execute(config: RuntimeConfig, json: bool) -> anyhow::Result<()> {
    let source = ModelSource::open(config.model_path.as_deref())?;
    let descriptor = ModelDescriptor::from_bytes(source.bytes())?;
    let graph = descriptor.graph()?.validate()?;

    let strategies: [Box<dyn PlanningStrategy>; 2] =
        [Box::new(Linear::new()), Box::new(GreedyReuse::new())];
    let plans = strategies
        .iter()
        .map(|s| s.plan(&graph))
        .collect::<Result<Vec<_>, _>>()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plans)?);
        return Ok(());
    }

    banner("loop-rt · Model Inspector");

    // ── Summary ────────────────────────────────────────────────
    println!("  Source:   {}", source.describe());
    println!("  Model:    {}", descriptor.name());
    println!(
        "  Format:   v{} (engine supports v{})",
        descriptor.format_version(),
        model_ir::SCHEMA_VERSION,
    );
    println!("  Size:     {} B, {} constants", descriptor.size_bytes(), descriptor.num_constants());
    println!("  Graph:    {}", graph.summary());
    println!();

    // ── Tensors ────────────────────────────────────────────────
    let lifetimes = graph.lifetimes();
    println!(
        "  {:<4} {:<12} {:<10} {:<10} {:>7} {:>8}",
        "Idx", "Name", "Kind", "Shape", "Bytes", "Live",
    );
    println!("  {}", "-".repeat(56));
    for (index, tensor) in graph.tensors.iter().enumerate() {
        let live = match lifetimes[index] {
            Some(l) => format!("{}..={}", l.first_op, l.last_op),
            None => "-".to_string(),
        };
        let role = if graph.is_input(index) {
            "input"
        } else if graph.is_output(index) {
            "output"
        } else if tensor.is_constant() {
            "constant"
        } else {
            "activation"
        };
        println!(
            "  {:<4} {:<12} {:<10} {:<10} {:>7} {:>8}",
            index,
            tensor.name,
            role,
            tensor.shape.to_string(),
            tensor.size_bytes(),
            live,
        );
    }
    println!();

    // ── Ops ────────────────────────────────────────────────────
    for (index, op) in graph.ops.iter().enumerate() {
        println!(
            "  op {index}: {:<16} {:?} -> {:?} ({})",
            op.kind.as_str(),
            op.inputs,
            op.outputs,
            op.kind.activation().as_str(),
        );
    }
    println!();

    // ── Arena plans ────────────────────────────────────────────
    for plan in &plans {
        println!("  {}", plan.summary());
        for alloc in &plan.allocations {
            println!(
                "     tensor {:<3} @ {:>4} .. {:>4}",
                alloc.tensor,
                alloc.offset,
                alloc.offset + alloc.size_bytes,
            );
        }
    }
    println!();

    // ── Arena footprint ────────────────────────────────────────
    let capacity = config.parse_capacity()?;
    let engine = InferenceEngine::new(Arena::new(capacity))
        .with_planner(config.create_planner()?)
        .load(source.bytes())
        .and_then(|engine| engine.allocate_tensors());
    match engine {
        Ok(engine) => {
            println!("  Arena ({capacity}) with '{}':", engine.plan().strategy_name);
            println!("   {}", engine.arena_stats().summary());
            println!("   {} B free", engine.arena().available_bytes());
        }
        Err(e) => println!("  Arena ({capacity}): {e}"),
    }
    println!();
    Ok(())
}
