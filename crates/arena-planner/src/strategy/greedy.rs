// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Greedy reuse: largest buffers first, lowest offset that fits.
//!
//! Buffers are placed in order of decreasing size (ties broken by tensor
//! index). Each buffer goes to the lowest aligned offset where it does not
//! collide with any already placed buffer whose lifetime intersects its
//! own. Buffers that are never live at the same time may share bytes.
//!
//! # Memory Model
//!
//! An activation needs its bytes from the op that produces it to the last
//! op that reads it, so two activations conflict only if those spans
//! intersect:
//!
//! ```text
//! op:      0     1     2
//! x   :  [=================]     graph input, live throughout
//! h1  :  [=========]
//! h2  :        [===========]
//! y   :              [=====]     may reuse h1's bytes
//! ```
//!
//! # When to use
//! - Default strategy: smallest block for chain-shaped graphs.

use crate::plan::{activation_buffers, PlanBuilder};
use crate::strategy::PlanningStrategy;
use crate::{ArenaPlan, PlannerError};
use memory_manager::{align_up, ArenaRegion, ARENA_ALIGNMENT};
use model_ir::{graph::Validated, GraphDef, TensorLifetime};

/// Largest-first placement with lifetime-aware reuse.
#[derive(Debug, Clone, Default)]
pub struct GreedyReuse;

impl GreedyReuse {
    pub fn new() -> Self {
        Self
    }
}

impl PlanningStrategy for GreedyReuse {
    fn name(&self) -> &str {
        "greedy-reuse"
    }

    fn plan(&self, graph: &GraphDef<Validated>) -> Result<ArenaPlan, PlannerError> {
        let mut buffers = activation_buffers(graph);
        if buffers.is_empty() {
            return Err(PlannerError::NothingToPlace);
        }
        buffers.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        let mut placed: Vec<(ArenaRegion, TensorLifetime)> = Vec::with_capacity(buffers.len());
        let mut builder = PlanBuilder::new(self.name());

        for (tensor, size, lifetime) in buffers {
            let offset = lowest_fit(&placed, size, &lifetime);
            placed.push((ArenaRegion::new(offset, size), lifetime));
            builder.place(tensor, offset, size, lifetime);
        }

        let plan = builder.build();
        plan.validate()?;
        tracing::debug!("{}", plan.summary());
        Ok(plan)
    }
}

/// Finds the lowest aligned offset where a buffer of `size` bytes does not
/// overlap any conflicting placed buffer.
fn lowest_fit(placed: &[(ArenaRegion, TensorLifetime)], size: usize, lifetime: &TensorLifetime) -> usize {
    let conflicts: Vec<ArenaRegion> = placed
        .iter()
        .filter(|(_, other)| other.intersects(lifetime))
        .map(|(region, _)| *region)
        .collect();

    // Candidate offsets: the block start, or just past a conflicting buffer.
    let mut candidates: Vec<usize> = std::iter::once(0)
        .chain(conflicts.iter().map(|r| align_up(r.end(), ARENA_ALIGNMENT)))
        .collect();
    candidates.sort_unstable();

    candidates
        .into_iter()
        .find(|&offset| {
            let candidate = ArenaRegion::new(offset, size);
            conflicts.iter().all(|r| !r.overlaps(&candidate))
        })
        // The offset past the furthest conflict always fits, so the
        // candidate list never comes up empty.
        .unwrap_or_else(|| {
            conflicts
                .iter()
                .map(|r| align_up(r.end(), ARENA_ALIGNMENT))
                .max()
                .unwrap_or(0)
        })
}
