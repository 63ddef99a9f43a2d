// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The [`PlanningStrategy`] trait and strategy implementations.

pub mod greedy;
pub mod linear;

use crate::{ArenaPlan, PlannerError};
use model_ir::{graph::Validated, GraphDef};

/// Trait for arena planning strategies.
///
/// Each strategy takes a validated graph and produces an [`ArenaPlan`]
/// placing every activation tensor in a single activation block.
///
/// Strategies are purely algorithmic — no I/O or allocation in the arena
/// itself — making them trivially unit-testable. Whether the resulting
/// block fits the arena is the runtime's decision.
pub trait PlanningStrategy: Send + Sync {
    /// Human-readable name of this strategy.
    fn name(&self) -> &str;

    /// Produces a plan for the given graph.
    fn plan(&self, graph: &GraphDef<Validated>) -> Result<ArenaPlan, PlannerError>;
}
