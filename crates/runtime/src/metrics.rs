// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Loop profiling metrics.
//!
//! [`LoopMetrics`] counts what the cyclic driver did and how long each
//! invoke took. Recording never allocates.

use std::time::Duration;

/// Aggregate counters for a run of the inference loop.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct LoopMetrics {
    /// Ticks attempted.
    pub ticks: u64,
    /// Ticks whose output reached the sink.
    pub emitted: u64,
    /// Ticks skipped because the invoke failed.
    pub failures: u64,
    /// Times the inference counter wrapped back to zero.
    pub cycles: u64,
    /// Time spent inside invoke across all ticks.
    pub total_invoke: Duration,
    /// Slowest single invoke.
    pub max_invoke: Duration,
}

impl LoopMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one tick.
    pub fn record(&mut self, invoke: Duration, emitted: bool, wrapped: bool) {
        self.ticks += 1;
        if emitted {
            self.emitted += 1;
        } else {
            self.failures += 1;
        }
        if wrapped {
            self.cycles += 1;
        }
        self.total_invoke = self.total_invoke.saturating_add(invoke);
        self.max_invoke = self.max_invoke.max(invoke);
    }

    /// Mean invoke time, zero before the first tick.
    pub fn mean_invoke(&self) -> Duration {
        if self.ticks == 0 {
            return Duration::ZERO;
        }
        let nanos = self.total_invoke.as_nanos() / u128::from(self.ticks);
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }

    /// Returns a human-readable summary suitable for CLI output.
    pub fn summary(&self) -> String {
        format!(
            "Loop: {} ticks ({} emitted, {} failed), {} cycles, invoke mean {:.1}µs max {:.1}µs",
            self.ticks,
            self.emitted,
            self.failures,
            self.cycles,
            self.mean_invoke().as_secs_f64() * 1e6,
            self.max_invoke.as_secs_f64() * 1e6,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_metrics() {
        let m = LoopMetrics::new();
        assert_eq!(m.ticks, 0);
        assert_eq!(m.mean_invoke(), Duration::ZERO);
    }

    #[test]
    fn test_record() {
        let mut m = LoopMetrics::new();
        m.record(Duration::from_micros(10), true, false);
        m.record(Duration::from_micros(30), false, true);
        m.record(Duration::from_micros(20), true, false);

        assert_eq!(m.ticks, 3);
        assert_eq!(m.emitted, 2);
        assert_eq!(m.failures, 1);
        assert_eq!(m.cycles, 1);
        assert_eq!(m.total_invoke, Duration::from_micros(60));
        assert_eq!(m.max_invoke, Duration::from_micros(30));
        assert_eq!(m.mean_invoke(), Duration::from_micros(20));
    }

    #[test]
    fn test_mean_past_u32_ticks() {
        let mut m = LoopMetrics::new();
        m.ticks = 1 << 32;
        m.total_invoke = Duration::from_secs(1 << 32);
        assert_eq!(m.mean_invoke(), Duration::from_secs(1));
        assert!(m.summary().contains("4294967296 ticks"));

        m.ticks = (1 << 32) + 2;
        m.total_invoke = Duration::from_secs(10);
        assert_eq!(m.mean_invoke(), Duration::from_nanos(2));
    }

    #[test]
    fn test_summary_format() {
        let mut m = LoopMetrics::new();
        m.record(Duration::from_micros(5), true, true);
        let s = m.summary();
        assert!(s.contains("Loop: 1 ticks"));
        assert!(s.contains("1 emitted, 0 failed"));
        assert!(s.contains("1 cycles"));
    }

    #[test]
    fn test_serialize() {
        let mut m = LoopMetrics::new();
        m.record(Duration::from_micros(5), true, false);
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["ticks"], 1);
        assert_eq!(json["emitted"], 1);
    }
}
