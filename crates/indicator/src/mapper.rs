// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Output state mapper.
//!
//! Owns an [`IndicatorBank`] and the one-time initialization latch. Every
//! call drives all four indicators explicitly, so nothing stays lit from a
//! previous state. Hardware errors are logged and counted, never
//! propagated: a flaky indicator must not stop the inference loop.

use crate::{DisplayState, Indicator, IndicatorBank};

/// Maps output values to display states on an indicator bank.
#[derive(Debug)]
pub struct OutputStateMapper<B: IndicatorBank> {
    bank: B,
    initialized: bool,
    last_state: Option<DisplayState>,
    write_failures: u64,
}

impl<B: IndicatorBank> OutputStateMapper<B> {
    /// Creates a mapper. The bank is not touched until the first
    /// [`apply`](OutputStateMapper::apply).
    pub fn new(bank: B) -> Self {
        Self {
            bank,
            initialized: false,
            last_state: None,
            write_failures: 0,
        }
    }

    /// Shows the state for output `y` (computed from input `x`).
    ///
    /// On the first call the bank is initialized; the latch is set even if
    /// initialization fails, so it is attempted at most once.
    pub fn apply(&mut self, x: f32, y: f32) -> DisplayState {
        if !self.initialized {
            self.initialized = true;
            match self.bank.initialize() {
                Ok(()) => tracing::debug!("indicator bank '{}' initialized", self.bank.name()),
                Err(e) => {
                    self.write_failures += 1;
                    tracing::warn!("indicator bank '{}' init failed: {e}", self.bank.name());
                }
            }
        }

        let state = DisplayState::from_value(y);
        for indicator in Indicator::ALL {
            if let Err(e) = self.bank.set(indicator, state.is_on(indicator)) {
                self.write_failures += 1;
                tracing::warn!("indicator {indicator} write failed: {e}");
            }
        }
        self.last_state = Some(state);

        tracing::info!("x_value: {x:.6}, y_value: {y:.6} {state}");
        state
    }

    /// Returns `true` once the bank has been initialized.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// The state shown by the most recent [`apply`](OutputStateMapper::apply).
    pub fn last_state(&self) -> Option<DisplayState> {
        self.last_state
    }

    /// Number of failed hardware calls so far.
    pub fn write_failures(&self) -> u64 {
        self.write_failures
    }

    pub fn bank(&self) -> &B {
        &self.bank
    }

    pub fn into_bank(self) -> B {
        self.bank
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{IndicatorError, MemoryBank};

    /// A bank whose writes to one indicator always fail.
    struct BrokenBank {
        inner: MemoryBank,
        broken: Indicator,
        fail_init: bool,
        init_calls: u32,
    }

    impl IndicatorBank for BrokenBank {
        fn name(&self) -> &str {
            "broken"
        }

        fn initialize(&mut self) -> Result<(), IndicatorError> {
            self.init_calls += 1;
            if self.fail_init {
                return Err(IndicatorError::NotAvailable {
                    path: "/dev/null/leds".into(),
                });
            }
            self.inner.initialize()
        }

        fn set(&mut self, indicator: Indicator, on: bool) -> Result<(), IndicatorError> {
            if indicator == self.broken {
                return Err(IndicatorError::WriteError {
                    path: format!("/leds/{indicator}"),
                    source: std::io::Error::other("stuck"),
                });
            }
            self.inner.set(indicator, on)
        }
    }

    #[test]
    fn test_reference_table() {
        let mut m = OutputStateMapper::new(MemoryBank::new());
        let cases = [
            (1.0, [false, false, true, true]),
            (0.5, [false, false, true, false]),
            (0.0, [false, false, false, false]),
            (-0.5, [false, true, false, false]),
            (-1.0, [true, false, false, false]),
        ];
        for (y, expected) in cases {
            m.apply(0.0, y);
            assert_eq!(m.bank().levels(), expected, "y = {y}");
        }
    }

    #[test]
    fn test_no_stale_indicators() {
        let mut m = OutputStateMapper::new(MemoryBank::new());
        m.apply(0.0, 1.0);
        m.apply(0.0, -1.0);
        assert_eq!(m.bank().levels(), [true, false, false, false]);
        m.apply(0.0, 0.0);
        assert_eq!(m.bank().levels(), [false; 4]);
    }

    #[test]
    fn test_initializes_once() {
        let mut m = OutputStateMapper::new(MemoryBank::new());
        assert!(!m.is_initialized());
        assert_eq!(m.bank().init_count(), 0);
        for i in 0..10 {
            m.apply(i as f32, (i as f32).sin());
        }
        assert!(m.is_initialized());
        assert_eq!(m.bank().init_count(), 1);
        assert_eq!(m.bank().writes(), 40);
    }

    #[test]
    fn test_last_state() {
        let mut m = OutputStateMapper::new(MemoryBank::new());
        assert_eq!(m.last_state(), None);
        assert_eq!(m.apply(5.0, -0.959), DisplayState::NegativeExtreme);
        assert_eq!(m.last_state(), Some(DisplayState::NegativeExtreme));
    }

    #[test]
    fn test_nan_turns_everything_off() {
        let mut m = OutputStateMapper::new(MemoryBank::new());
        m.apply(0.0, 1.0);
        assert_eq!(m.apply(0.0, f32::NAN), DisplayState::Zero);
        assert_eq!(m.bank().levels(), [false; 4]);
    }

    #[test]
    fn test_write_failures_are_not_fatal() {
        let bank = BrokenBank {
            inner: MemoryBank::new(),
            broken: Indicator::C,
            fail_init: false,
            init_calls: 0,
        };
        let mut m = OutputStateMapper::new(bank);
        m.apply(0.0, 1.0);
        // The healthy indicators were still driven.
        assert!(m.bank().inner.is_on(Indicator::D));
        m.apply(0.0, 0.5);
        assert!(!m.bank().inner.is_on(Indicator::D));
        assert_eq!(m.write_failures(), 2);
        assert_eq!(m.last_state(), Some(DisplayState::Positive));
    }

    #[test]
    fn test_failed_init_is_not_retried() {
        let bank = BrokenBank {
            inner: MemoryBank::new(),
            broken: Indicator::A,
            fail_init: true,
            init_calls: 0,
        };
        let mut m = OutputStateMapper::new(bank);
        m.apply(0.0, 0.1);
        m.apply(0.0, 0.2);
        assert!(m.is_initialized());
        let bank = m.into_bank();
        assert_eq!(bank.init_calls, 1);
        assert!(bank.inner.is_on(Indicator::C));
    }
}
