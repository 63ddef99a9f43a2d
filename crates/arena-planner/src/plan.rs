// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Arena plan: the output of the planner.
//!
//! A plan assigns each activation tensor an offset inside one contiguous
//! activation block. The runtime carves that block from the arena head
//! once and never moves anything afterwards. The plan is the contract
//! between the planner and the runtime.

use crate::PlannerError;
use memory_manager::{align_up, ArenaRegion, ARENA_ALIGNMENT};
use model_ir::TensorLifetime;

/// Placement of a single activation tensor.
#[derive(Debug, Clone, serde::Serialize)]
pub struct BufferAllocation {
    /// Tensor index in the graph.
    pub tensor: usize,
    /// Byte offset from the start of the activation block.
    pub offset: usize,
    /// Size of the tensor data in bytes.
    pub size_bytes: usize,
    /// Ops during which the buffer must hold its value.
    pub lifetime: TensorLifetime,
}

impl BufferAllocation {
    /// The buffer's bytes, relative to the activation block.
    pub fn region(&self) -> ArenaRegion {
        ArenaRegion::new(self.offset, self.size_bytes)
    }
}

/// The complete placement produced by a [`crate::PlanningStrategy`].
#[derive(Debug, Clone, serde::Serialize)]
pub struct ArenaPlan {
    /// Strategy name that produced this plan.
    pub strategy_name: String,
    /// One entry per activation tensor, in tensor-index order.
    pub allocations: Vec<BufferAllocation>,
    /// Size of the activation block, rounded up to the arena alignment.
    pub total_bytes: usize,
    /// Block size without any reuse, for comparison.
    pub unshared_bytes: usize,
}

impl ArenaPlan {
    /// Returns the number of placed buffers.
    pub fn num_buffers(&self) -> usize {
        self.allocations.len()
    }

    /// Looks up the placement of a tensor.
    pub fn allocation(&self, tensor: usize) -> Option<&BufferAllocation> {
        self.allocations.iter().find(|a| a.tensor == tensor)
    }

    /// Validates the plan.
    ///
    /// Checks:
    /// - Plan is non-empty.
    /// - Every buffer is non-empty, aligned, and inside the block.
    /// - Buffers whose lifetimes intersect do not share any byte.
    pub fn validate(&self) -> Result<(), PlannerError> {
        if self.allocations.is_empty() {
            return Err(PlannerError::NothingToPlace);
        }

        let failed = |detail: String| PlannerError::StrategyFailed {
            strategy: self.strategy_name.clone(),
            detail,
        };

        for a in &self.allocations {
            if a.size_bytes == 0 {
                return Err(failed(format!("tensor {} has an empty buffer", a.tensor)));
            }
            if a.offset % ARENA_ALIGNMENT != 0 {
                return Err(failed(format!(
                    "tensor {} at offset {} is not {ARENA_ALIGNMENT}-byte aligned",
                    a.tensor, a.offset
                )));
            }
            if a.region().end() > self.total_bytes {
                return Err(failed(format!(
                    "tensor {} ends at {} beyond block size {}",
                    a.tensor,
                    a.region().end(),
                    self.total_bytes
                )));
            }
        }

        for (i, a) in self.allocations.iter().enumerate() {
            for b in &self.allocations[i + 1..] {
                if a.lifetime.intersects(&b.lifetime) && a.region().overlaps(&b.region()) {
                    return Err(PlannerError::Overlap {
                        strategy: self.strategy_name.clone(),
                        first: a.tensor,
                        second: b.tensor,
                    });
                }
            }
        }

        Ok(())
    }

    /// Returns a human-readable summary of the plan.
    pub fn summary(&self) -> String {
        let saved = self.unshared_bytes.saturating_sub(self.total_bytes);
        let saved_pct = if self.unshared_bytes == 0 {
            0.0
        } else {
            saved as f64 / self.unshared_bytes as f64 * 100.0
        };
        format!(
            "Plan '{}': {} buffers in {} B (unshared {} B, {:.0}% saved)",
            self.strategy_name,
            self.num_buffers(),
            self.total_bytes,
            self.unshared_bytes,
            saved_pct,
        )
    }
}

/// Builder helper for constructing an `ArenaPlan` incrementally.
///
/// Used internally by strategy implementations.
pub(crate) struct PlanBuilder {
    strategy_name: String,
    allocations: Vec<BufferAllocation>,
}

impl PlanBuilder {
    /// Creates a new builder.
    pub fn new(strategy_name: &str) -> Self {
        Self {
            strategy_name: strategy_name.to_string(),
            allocations: Vec::new(),
        }
    }

    /// Records the placement of one tensor.
    pub fn place(&mut self, tensor: usize, offset: usize, size_bytes: usize, lifetime: TensorLifetime) {
        self.allocations.push(BufferAllocation {
            tensor,
            offset,
            size_bytes,
            lifetime,
        });
    }

    /// Finalises the plan, computing block sizes.
    pub fn build(mut self) -> ArenaPlan {
        self.allocations.sort_by_key(|a| a.tensor);
        let end = self
            .allocations
            .iter()
            .map(|a| a.region().end())
            .max()
            .unwrap_or(0);
        let unshared_bytes = self
            .allocations
            .iter()
            .map(|a| align_up(a.size_bytes, ARENA_ALIGNMENT))
            .sum();

        ArenaPlan {
            strategy_name: self.strategy_name,
            allocations: self.allocations,
            total_bytes: align_up(end, ARENA_ALIGNMENT),
            unshared_bytes,
        }
    }
}

/// Collects `(tensor, size, lifetime)` for every activation in a graph.
pub(crate) fn activation_buffers(
    graph: &model_ir::GraphDef<model_ir::graph::Validated>,
) -> Vec<(usize, usize, TensorLifetime)> {
    let lifetimes = graph.lifetimes();
    graph
        .activations()
        .filter_map(|(index, tensor)| lifetimes[index].map(|span| (index, tensor.size_bytes(), span)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(first_op: usize, last_op: usize) -> TensorLifetime {
        TensorLifetime { first_op, last_op }
    }

    fn make_plan(placements: &[(usize, usize, usize, TensorLifetime)]) -> ArenaPlan {
        let mut builder = PlanBuilder::new("test");
        for &(tensor, offset, size, lifetime) in placements {
            builder.place(tensor, offset, size, lifetime);
        }
        builder.build()
    }

    #[test]
    fn test_valid_plan() {
        let plan = make_plan(&[(0, 0, 64, span(0, 1)), (1, 0, 4, span(2, 2)), (2, 64, 64, span(1, 2))]);
        plan.validate().unwrap();
        assert_eq!(plan.total_bytes, 128);
        assert_eq!(plan.unshared_bytes, 64 + 16 + 64);
        assert_eq!(plan.num_buffers(), 3);
        assert_eq!(plan.allocation(2).unwrap().offset, 64);
        assert!(plan.allocation(9).is_none());
    }

    #[test]
    fn test_total_is_aligned() {
        let plan = make_plan(&[(0, 0, 4, span(0, 0))]);
        assert_eq!(plan.total_bytes, 16);
    }

    #[test]
    fn test_empty_plan() {
        let plan = make_plan(&[]);
        assert!(matches!(plan.validate(), Err(PlannerError::NothingToPlace)));
    }

    #[test]
    fn test_overlap_detected() {
        let plan = make_plan(&[(0, 0, 64, span(0, 1)), (1, 48, 32, span(1, 2))]);
        let err = plan.validate().unwrap_err();
        assert!(matches!(err, PlannerError::Overlap { first: 0, second: 1, .. }));
    }

    #[test]
    fn test_overlap_allowed_when_lifetimes_disjoint() {
        let plan = make_plan(&[(0, 0, 64, span(0, 0)), (1, 0, 64, span(1, 1))]);
        plan.validate().unwrap();
    }

    #[test]
    fn test_misaligned_rejected() {
        let plan = make_plan(&[(0, 8, 4, span(0, 0))]);
        assert!(matches!(plan.validate(), Err(PlannerError::StrategyFailed { .. })));
    }

    #[test]
    fn test_summary() {
        let plan = make_plan(&[(0, 0, 64, span(0, 0)), (1, 0, 64, span(1, 1))]);
        let s = plan.summary();
        assert!(s.contains("'test'"));
        assert!(s.contains("2 buffers in 64 B"));
        assert!(s.contains("50% saved"));
    }
}
