// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Indicator ids and the bank capability.

use crate::IndicatorError;
use std::fmt;

/// One of the four on/off indicators.
///
/// `A` marks the negative extreme, `B` negative, `C` positive and `D` the
/// positive extreme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Indicator {
    A,
    B,
    C,
    D,
}

impl Indicator {
    /// All indicators in physical order.
    pub const ALL: [Indicator; 4] = [Indicator::A, Indicator::B, Indicator::C, Indicator::D];

    /// Position in [`Indicator::ALL`].
    pub fn index(self) -> usize {
        match self {
            Indicator::A => 0,
            Indicator::B => 1,
            Indicator::C => 2,
            Indicator::D => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Indicator::A => "A",
            Indicator::B => "B",
            Indicator::C => "C",
            Indicator::D => "D",
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hardware capability driving the indicators.
///
/// Implementations are synchronous. Errors are reported but callers treat
/// them as non-fatal.
pub trait IndicatorBank {
    /// Short name for logs (e.g. `"sysfs"`).
    fn name(&self) -> &str;

    /// Prepares the hardware. Called once, before the first [`set`](IndicatorBank::set).
    fn initialize(&mut self) -> Result<(), IndicatorError>;

    /// Switches one indicator on or off.
    fn set(&mut self, indicator: Indicator, on: bool) -> Result<(), IndicatorError>;
}

impl<B: IndicatorBank + ?Sized> IndicatorBank for Box<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn initialize(&mut self) -> Result<(), IndicatorError> {
        (**self).initialize()
    }

    fn set(&mut self, indicator: Indicator, on: bool) -> Result<(), IndicatorError> {
        (**self).set(indicator, on)
    }
}

/// An in-memory bank that records indicator levels.
///
/// Used on hosts without indicator hardware and in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryBank {
    levels: [bool; 4],
    init_count: u32,
    writes: u64,
}

impl MemoryBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether an indicator is currently on.
    pub fn is_on(&self, indicator: Indicator) -> bool {
        self.levels[indicator.index()]
    }

    /// Current levels in `A..D` order.
    pub fn levels(&self) -> [bool; 4] {
        self.levels
    }

    /// How many times [`initialize`](IndicatorBank::initialize) ran.
    pub fn init_count(&self) -> u32 {
        self.init_count
    }

    /// Total number of `set` calls.
    pub fn writes(&self) -> u64 {
        self.writes
    }
}

impl IndicatorBank for MemoryBank {
    fn name(&self) -> &str {
        "memory"
    }

    fn initialize(&mut self) -> Result<(), IndicatorError> {
        self.init_count += 1;
        self.levels = [false; 4];
        Ok(())
    }

    fn set(&mut self, indicator: Indicator, on: bool) -> Result<(), IndicatorError> {
        self.levels[indicator.index()] = on;
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_match_order() {
        for (i, ind) in Indicator::ALL.iter().enumerate() {
            assert_eq!(ind.index(), i);
        }
        assert_eq!(Indicator::C.to_string(), "C");
    }

    #[test]
    fn test_memory_bank() {
        let mut bank = MemoryBank::new();
        bank.initialize().unwrap();
        bank.set(Indicator::B, true).unwrap();
        assert!(bank.is_on(Indicator::B));
        assert_eq!(bank.levels(), [false, true, false, false]);
        bank.set(Indicator::B, false).unwrap();
        assert!(!bank.is_on(Indicator::B));
        assert_eq!(bank.writes(), 2);
        assert_eq!(bank.init_count(), 1);
    }

    #[test]
    fn test_boxed_bank() {
        let mut bank: Box<dyn IndicatorBank> = Box::new(MemoryBank::new());
        bank.initialize().unwrap();
        bank.set(Indicator::A, true).unwrap();
        assert_eq!(bank.name(), "memory");
    }

    #[test]
    fn test_serde() {
        let json = serde_json::to_string(&Indicator::D).unwrap();
        assert_eq!(json, "\"D\"");
    }
}
