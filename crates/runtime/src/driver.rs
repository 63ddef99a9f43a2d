// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The cyclic input driver.
//!
//! Each tick turns the inference counter into an input value, runs the
//! engine, and forwards `(x, y)` to an [`OutputSink`]:
//!
//! ```text
//! position = counter / steps_per_cycle      in [0, 1)
//! x        = position * x_range
//! y        = model(x)
//! counter  = (counter + 1) % steps_per_cycle
//! ```
//!
//! A failed invoke skips the sink for that tick but still advances the
//! counter, so one bad sample cannot stall the cycle.

use crate::engine::{Allocated, InferenceEngine};
use crate::evaluator::Evaluator;
use crate::{LoopMetrics, RuntimeError};
use indicator::{IndicatorBank, OutputStateMapper};
use std::time::Instant;

/// Largest supported cycle length. Every counter value and its quotient
/// stay exact in `f32` up to this bound, so `position` never rounds to 1.
pub const MAX_STEPS_PER_CYCLE: u32 = 1 << 24;

/// Position within the input cycle, in `[0, steps_per_cycle)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InferenceCounter {
    value: u32,
    steps: u32,
}

impl InferenceCounter {
    /// Creates a counter at zero.
    pub fn new(steps_per_cycle: u32) -> Result<Self, RuntimeError> {
        if steps_per_cycle == 0 || steps_per_cycle > MAX_STEPS_PER_CYCLE {
            return Err(RuntimeError::ConfigError(format!(
                "steps_per_cycle must be in 1..={MAX_STEPS_PER_CYCLE}, got {steps_per_cycle}"
            )));
        }
        Ok(Self {
            value: 0,
            steps: steps_per_cycle,
        })
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn steps_per_cycle(&self) -> u32 {
        self.steps
    }

    /// `value / steps_per_cycle`, always in `[0, 1)`.
    pub fn position(&self) -> f32 {
        self.value as f32 / self.steps as f32
    }

    /// Moves to the next step. Returns `true` when the counter wrapped.
    pub fn advance(&mut self) -> bool {
        self.value += 1;
        if self.value >= self.steps {
            self.value = 0;
            true
        } else {
            false
        }
    }
}

/// Receives each successful `(x, y)` pair.
pub trait OutputSink {
    fn handle(&mut self, x: f32, y: f32);
}

impl<B: IndicatorBank> OutputSink for OutputStateMapper<B> {
    fn handle(&mut self, x: f32, y: f32) {
        self.apply(x, y);
    }
}

impl<S: OutputSink + ?Sized> OutputSink for &mut S {
    fn handle(&mut self, x: f32, y: f32) {
        (**self).handle(x, y);
    }
}

/// What happened on one tick.
#[derive(Debug)]
pub enum TickOutcome {
    /// The engine produced `y` and the sink received it.
    Emitted { x: f32, y: f32 },
    /// The invoke failed; nothing was sent to the sink.
    Skipped { x: f32, error: RuntimeError },
}

impl TickOutcome {
    pub fn x(&self) -> f32 {
        match self {
            TickOutcome::Emitted { x, .. } | TickOutcome::Skipped { x, .. } => *x,
        }
    }

    pub fn is_emitted(&self) -> bool {
        matches!(self, TickOutcome::Emitted { .. })
    }
}

/// Drives an allocated engine around the input cycle.
#[derive(Debug, Clone)]
pub struct CyclicDriver {
    counter: InferenceCounter,
    x_range: f32,
    metrics: LoopMetrics,
}

impl CyclicDriver {
    /// Creates a driver sweeping `[0, x_range)` in `steps_per_cycle` steps.
    pub fn new(steps_per_cycle: u32, x_range: f32) -> Result<Self, RuntimeError> {
        if !x_range.is_finite() || x_range <= 0.0 {
            return Err(RuntimeError::ConfigError(format!(
                "x_range must be finite and positive, got {x_range}"
            )));
        }
        Ok(Self {
            counter: InferenceCounter::new(steps_per_cycle)?,
            x_range,
            metrics: LoopMetrics::new(),
        })
    }

    pub fn counter(&self) -> InferenceCounter {
        self.counter
    }

    pub fn x_range(&self) -> f32 {
        self.x_range
    }

    pub fn metrics(&self) -> &LoopMetrics {
        &self.metrics
    }

    /// Input value for the current counter position.
    pub fn next_x(&self) -> f32 {
        self.counter.position() * self.x_range
    }

    /// Runs one step of the loop.
    pub fn tick<E, S>(
        &mut self,
        engine: &mut InferenceEngine<'_, Allocated, E>,
        sink: &mut S,
    ) -> TickOutcome
    where
        E: Evaluator,
        S: OutputSink + ?Sized,
    {
        let x = self.next_x();
        let started = Instant::now();
        let result = infer(engine, x);
        let elapsed = started.elapsed();
        let wrapped = self.counter.advance();

        match result {
            Ok(y) => {
                self.metrics.record(elapsed, true, wrapped);
                sink.handle(x, y);
                TickOutcome::Emitted { x, y }
            }
            Err(error) => {
                self.metrics.record(elapsed, false, wrapped);
                tracing::warn!("invoke failed on x_value: {x:.6}: {error}");
                TickOutcome::Skipped { x, error }
            }
        }
    }

    /// Ticks `max_ticks` times, or forever when `None`.
    pub fn run<E, S>(
        &mut self,
        engine: &mut InferenceEngine<'_, Allocated, E>,
        sink: &mut S,
        max_ticks: Option<u64>,
    ) -> &LoopMetrics
    where
        E: Evaluator,
        S: OutputSink + ?Sized,
    {
        let mut remaining = max_ticks;
        while remaining != Some(0) {
            self.tick(engine, sink);
            if let Some(n) = remaining.as_mut() {
                *n -= 1;
            }
        }
        tracing::info!("{}", self.metrics.summary());
        &self.metrics
    }
}

/// Writes `x` to input 0, invokes, and reads element 0 of output 0.
fn infer<E: Evaluator>(
    engine: &mut InferenceEngine<'_, Allocated, E>,
    x: f32,
) -> Result<f32, RuntimeError> {
    let input = engine.input(0)?;
    engine.tensor_mut(input)?.set_f32(0, x)?;
    engine.invoke()?;
    let output = engine.output(0)?;
    Ok(engine.tensor(output)?.f32_at(0)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_rejects_zero() {
        assert!(matches!(
            InferenceCounter::new(0),
            Err(RuntimeError::ConfigError(_))
        ));
        assert!(InferenceCounter::new(MAX_STEPS_PER_CYCLE + 1).is_err());
        assert!(InferenceCounter::new(MAX_STEPS_PER_CYCLE).is_ok());
    }

    #[test]
    fn test_counter_wraps() {
        let mut counter = InferenceCounter::new(20).unwrap();
        for step in 0..20 {
            assert_eq!(counter.value(), step);
            let wrapped = counter.advance();
            assert_eq!(wrapped, step == 19);
        }
        assert_eq!(counter.value(), 0);
    }

    #[test]
    fn test_position_never_reaches_one() {
        for steps in [1, 2, 3, 7, 20, 1000, MAX_STEPS_PER_CYCLE] {
            let counter = InferenceCounter {
                value: steps - 1,
                steps,
            };
            let position = counter.position();
            assert!((0.0..1.0).contains(&position), "steps {steps}: {position}");
        }
    }

    #[test]
    fn test_single_step_cycle() {
        let mut counter = InferenceCounter::new(1).unwrap();
        assert_eq!(counter.position(), 0.0);
        assert!(counter.advance());
        assert_eq!(counter.position(), 0.0);
    }

    #[test]
    fn test_driver_rejects_bad_range() {
        assert!(CyclicDriver::new(20, 0.0).is_err());
        assert!(CyclicDriver::new(20, -1.0).is_err());
        assert!(CyclicDriver::new(20, f32::NAN).is_err());
        assert!(CyclicDriver::new(20, f32::INFINITY).is_err());
    }

    #[test]
    fn test_next_x() {
        let driver = CyclicDriver::new(4, 2.0).unwrap();
        assert_eq!(driver.next_x(), 0.0);
        assert_eq!(driver.x_range(), 2.0);
    }
}
