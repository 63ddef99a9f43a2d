// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Linear placement: every activation gets its own slot.
//!
//! Buffers are laid out in tensor-index order, each starting at the next
//! aligned offset after the previous one. Nothing is shared, so the block
//! is as large as it can get, but the layout is trivial to reason about
//! when debugging a model.

use crate::plan::{activation_buffers, PlanBuilder};
use crate::strategy::PlanningStrategy;
use crate::{ArenaPlan, PlannerError};
use memory_manager::{align_up, ARENA_ALIGNMENT};
use model_ir::{graph::Validated, GraphDef};

/// One slot per activation, no reuse.
#[derive(Debug, Clone, Default)]
pub struct Linear;

impl Linear {
    pub fn new() -> Self {
        Self
    }
}

impl PlanningStrategy for Linear {
    fn name(&self) -> &str {
        "linear"
    }

    fn plan(&self, graph: &GraphDef<Validated>) -> Result<ArenaPlan, PlannerError> {
        let buffers = activation_buffers(graph);
        if buffers.is_empty() {
            return Err(PlannerError::NothingToPlace);
        }

        let mut builder = PlanBuilder::new(self.name());
        let mut cursor = 0;
        for (tensor, size, lifetime) in buffers {
            let offset = align_up(cursor, ARENA_ALIGNMENT);
            builder.place(tensor, offset, size, lifetime);
            cursor = offset + size;
        }

        let plan = builder.build();
        plan.validate()?;
        tracing::debug!("{}", plan.summary());
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model_ir::{sine_model, ModelDescriptor};

    #[test]
    fn test_sine_layout() {
        let blob = sine_model().unwrap();
        let d = ModelDescriptor::from_bytes(&blob).unwrap();
        let graph = d.graph().unwrap().validate().unwrap();

        let plan = Linear::new().plan(&graph).unwrap();
        assert_eq!(plan.num_buffers(), 4);
        // x@0 (4 B), h1@16 (64 B), h2@80 (64 B), y@144 (4 B)
        assert_eq!(plan.allocation(0).unwrap().offset, 0);
        assert_eq!(plan.allocation(3).unwrap().offset, 16);
        assert_eq!(plan.allocation(6).unwrap().offset, 80);
        assert_eq!(plan.allocation(9).unwrap().offset, 144);
        assert_eq!(plan.total_bytes, 160);
        assert_eq!(plan.total_bytes, plan.unshared_bytes);
    }
}
