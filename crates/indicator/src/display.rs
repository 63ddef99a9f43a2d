// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The five display states and their threshold bands.

use crate::Indicator;
use std::fmt;

/// Band boundary between the moderate and extreme states.
pub const EXTREME_THRESHOLD: f32 = 0.75;

/// A discrete display state selected purely from the output value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayState {
    /// `y ≤ -0.75`: A on.
    NegativeExtreme,
    /// `-0.75 < y < 0`: B on.
    Negative,
    /// `y == 0` (or not a number): all off.
    Zero,
    /// `0 < y < 0.75`: C on.
    Positive,
    /// `y ≥ 0.75`: C and D on.
    PositiveExtreme,
}

impl DisplayState {
    /// Selects the band containing `y`.
    ///
    /// The bands are exclusive and cover the real line. `NaN` falls in no
    /// band and maps to [`DisplayState::Zero`], leaving every indicator off.
    pub fn from_value(y: f32) -> Self {
        if y >= EXTREME_THRESHOLD {
            Self::PositiveExtreme
        } else if y > 0.0 {
            Self::Positive
        } else if y <= -EXTREME_THRESHOLD {
            Self::NegativeExtreme
        } else if y < 0.0 {
            Self::Negative
        } else {
            Self::Zero
        }
    }

    /// Indicator levels in `A..D` order.
    pub fn pattern(self) -> [bool; 4] {
        match self {
            Self::NegativeExtreme => [true, false, false, false],
            Self::Negative => [false, true, false, false],
            Self::Zero => [false; 4],
            Self::Positive => [false, false, true, false],
            Self::PositiveExtreme => [false, false, true, true],
        }
    }

    /// Whether `indicator` is lit in this state.
    pub fn is_on(self, indicator: Indicator) -> bool {
        self.pattern()[indicator.index()]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NegativeExtreme => "negative-extreme",
            Self::Negative => "negative",
            Self::Zero => "zero",
            Self::Positive => "positive",
            Self::PositiveExtreme => "positive-extreme",
        }
    }
}

/// Renders the lit indicators, e.g. `[ . . C D ]`.
impl fmt::Display for DisplayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for ind in Indicator::ALL {
            if self.is_on(ind) {
                write!(f, " {ind}")?;
            } else {
                write!(f, " .")?;
            }
        }
        write!(f, " ]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_values() {
        assert_eq!(DisplayState::from_value(1.0), DisplayState::PositiveExtreme);
        assert_eq!(DisplayState::from_value(0.5), DisplayState::Positive);
        assert_eq!(DisplayState::from_value(0.0), DisplayState::Zero);
        assert_eq!(DisplayState::from_value(-0.5), DisplayState::Negative);
        assert_eq!(DisplayState::from_value(-1.0), DisplayState::NegativeExtreme);
    }

    #[test]
    fn test_band_edges() {
        assert_eq!(DisplayState::from_value(0.75), DisplayState::PositiveExtreme);
        assert_eq!(DisplayState::from_value(0.749_999), DisplayState::Positive);
        assert_eq!(DisplayState::from_value(-0.75), DisplayState::NegativeExtreme);
        assert_eq!(DisplayState::from_value(-0.749_999), DisplayState::Negative);
        assert_eq!(DisplayState::from_value(f32::MIN_POSITIVE), DisplayState::Positive);
        assert_eq!(DisplayState::from_value(-f32::MIN_POSITIVE), DisplayState::Negative);
        assert_eq!(DisplayState::from_value(-0.0), DisplayState::Zero);
    }

    #[test]
    fn test_non_finite() {
        assert_eq!(DisplayState::from_value(f32::NAN), DisplayState::Zero);
        assert_eq!(DisplayState::from_value(f32::INFINITY), DisplayState::PositiveExtreme);
        assert_eq!(DisplayState::from_value(f32::NEG_INFINITY), DisplayState::NegativeExtreme);
    }

    #[test]
    fn test_patterns() {
        use Indicator::*;
        let s = DisplayState::PositiveExtreme;
        assert!(s.is_on(C) && s.is_on(D) && !s.is_on(A) && !s.is_on(B));
        assert_eq!(DisplayState::Positive.pattern(), [false, false, true, false]);
        assert_eq!(DisplayState::Zero.pattern(), [false; 4]);
        assert_eq!(DisplayState::Negative.pattern(), [false, true, false, false]);
        assert_eq!(DisplayState::NegativeExtreme.pattern(), [true, false, false, false]);
    }

    #[test]
    fn test_display() {
        assert_eq!(DisplayState::PositiveExtreme.to_string(), "[ . . C D ]");
        assert_eq!(DisplayState::Zero.to_string(), "[ . . . . ]");
        assert_eq!(DisplayState::NegativeExtreme.as_str(), "negative-extreme");
    }
}
