// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # arena-planner
//!
//! Decides where every activation tensor lives inside the arena's
//! activation block, using pluggable strategies.
//!
//! # Strategies
//!
//! | Strategy | Reuse | Block size |
//! |---|---|---|
//! | [`Linear`] | none: one slot per activation | sum of all activations |
//! | [`GreedyReuse`] | buffers with disjoint lifetimes share bytes | peak of simultaneously live activations (approx.) |
//!
//! # Trait-Based Extensibility
//!
//! All strategies implement [`PlanningStrategy`], so new strategies can
//! be added without modifying the runtime:
//!
//! ```ignore
//! struct MyCustomStrategy;
//! impl PlanningStrategy for MyCustomStrategy {
//!     fn name(&self) -> &str { "custom" }
//!     fn plan(&self, graph: &GraphDef<Validated>) -> Result<ArenaPlan, PlannerError> { /* ... */ }
//! }
//! ```
//!
//! # Example
//! ```
//! use arena_planner::{GreedyReuse, PlanningStrategy};
//! use model_ir::{sine_model, ModelDescriptor};
//!
//! let blob = sine_model().unwrap();
//! let descriptor = ModelDescriptor::from_bytes(&blob).unwrap();
//! let graph = descriptor.graph().unwrap().validate().unwrap();
//!
//! let plan = GreedyReuse::new().plan(&graph).unwrap();
//! assert_eq!(plan.total_bytes, 144);
//! println!("{}", plan.summary());
//! ```

mod error;
pub(crate) mod plan;
pub mod strategy;

pub use error::PlannerError;
pub use plan::{ArenaPlan, BufferAllocation};
pub use strategy::greedy::GreedyReuse;
pub use strategy::linear::Linear;
pub use strategy::PlanningStrategy;

/// Creates a strategy from its configuration name.
///
/// Accepts `"linear"` and `"greedy"` (alias `"greedy-reuse"`).
pub fn strategy_by_name(name: &str) -> Result<Box<dyn PlanningStrategy>, PlannerError> {
    match name {
        "linear" => Ok(Box::new(Linear::new())),
        "greedy" | "greedy-reuse" => Ok(Box::new(GreedyReuse::new())),
        other => Err(PlannerError::UnknownStrategy(other.to_string())),
    }
}
