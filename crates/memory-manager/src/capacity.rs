// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Arena capacity configuration and parsing.
//!
//! An [`ArenaCapacity`] is chosen before any model is known and never
//! changes afterwards. It supports human-readable string parsing so that
//! configuration files and the CLI can say `"2K"` instead of `2048`.

use crate::MemoryError;
use std::fmt;

/// Default arena size: 2 KB, enough for the built-in sine model.
const DEFAULT_CAPACITY_BYTES: usize = 2 * 1024;

/// The fixed size of an [`Arena`](crate::Arena).
///
/// # Parsing
/// - `"2K"` or `"2KB"` → 2 × 1024 bytes
/// - `"1M"` or `"1MB"` → 1 × 1024² bytes
/// - `"512B"` or `"512"` → raw byte count
///
/// # Examples
/// ```
/// use memory_manager::ArenaCapacity;
///
/// let c = ArenaCapacity::parse("2K").unwrap();
/// assert_eq!(c.as_bytes(), 2048);
/// assert_eq!(c.to_string(), "2 KB");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ArenaCapacity {
    bytes: usize,
}

impl ArenaCapacity {
    /// Creates a capacity from a byte count.
    pub fn from_bytes(bytes: usize) -> Self {
        Self { bytes }
    }

    /// Creates a capacity from kilobytes.
    pub fn from_kb(kb: usize) -> Self {
        Self { bytes: kb * 1024 }
    }

    /// Returns the capacity in bytes.
    pub fn as_bytes(&self) -> usize {
        self.bytes
    }

    /// Parses a human-readable capacity string. Case-insensitive.
    pub fn parse(s: &str) -> Result<Self, MemoryError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(MemoryError::InvalidCapacity("empty capacity string".into()));
        }

        let upper = s.to_uppercase();
        let (num_str, multiplier) = [("KB", 1024), ("K", 1024), ("MB", 1024 * 1024), ("M", 1024 * 1024), ("B", 1)]
            .iter()
            .find(|(suffix, _)| upper.ends_with(suffix))
            .map(|(suffix, mult)| (&s[..s.len() - suffix.len()], *mult))
            .unwrap_or((s, 1));

        let value: usize = num_str.trim().parse().map_err(|_| {
            MemoryError::InvalidCapacity(format!(
                "'{s}': expected a number followed by an optional suffix (B, K, M)"
            ))
        })?;

        let bytes = value
            .checked_mul(multiplier)
            .ok_or_else(|| MemoryError::InvalidCapacity(format!("'{s}' overflows")))?;

        if bytes == 0 {
            return Err(MemoryError::InvalidCapacity(format!("'{s}' is zero")));
        }

        Ok(Self { bytes })
    }
}

impl Default for ArenaCapacity {
    fn default() -> Self {
        Self::from_bytes(DEFAULT_CAPACITY_BYTES)
    }
}

impl fmt::Display for ArenaCapacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bytes >= 1024 * 1024 && self.bytes % (1024 * 1024) == 0 {
            write!(f, "{} MB", self.bytes / (1024 * 1024))
        } else if self.bytes >= 1024 && self.bytes % 1024 == 0 {
            write!(f, "{} KB", self.bytes / 1024)
        } else {
            write!(f, "{} B", self.bytes)
        }
    }
}
