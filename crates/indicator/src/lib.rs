// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # indicator
//!
//! Turns the model's scalar output into one of five discrete display
//! states over four on/off indicators.
//!
//! # Key Components
//!
//! - [`Indicator`] — the four indicator ids `A`..`D`.
//! - [`IndicatorBank`] — the hardware capability: a one-time
//!   initialization and per-indicator on/off writes.
//! - [`DisplayState`] — the five threshold bands and the indicator pattern
//!   each one lights.
//! - [`OutputStateMapper`] — applies a value to a bank: initializes the
//!   hardware exactly once, then drives every indicator explicitly.
//! - [`MemoryBank`] and [`SysfsLeds`] — an in-memory bank for hosts and
//!   tests, and a Linux LED class bank for real boards.
//!
//! # Bands
//!
//! | y | D | C | B | A |
//! |---|---|---|---|---|
//! | `y ≥ 0.75` | on | on | off | off |
//! | `0 < y < 0.75` | off | on | off | off |
//! | `y == 0` | off | off | off | off |
//! | `-0.75 < y < 0` | off | off | on | off |
//! | `y ≤ -0.75` | off | off | off | on |
//!
//! # Example
//! ```
//! use indicator::{DisplayState, Indicator, MemoryBank, OutputStateMapper};
//!
//! let mut mapper = OutputStateMapper::new(MemoryBank::new());
//! assert_eq!(mapper.apply(0.3, 0.9), DisplayState::PositiveExtreme);
//! assert!(mapper.bank().is_on(Indicator::D));
//! assert!(mapper.bank().is_on(Indicator::C));
//! assert_eq!(mapper.bank().init_count(), 1);
//! ```

mod bank;
mod display;
mod error;
mod mapper;
mod sysfs;

pub use bank::{Indicator, IndicatorBank, MemoryBank};
pub use display::DisplayState;
pub use error::IndicatorError;
pub use mapper::OutputStateMapper;
pub use sysfs::{SysfsLeds, DEFAULT_LED_NAMES, LED_CLASS_ROOT};
