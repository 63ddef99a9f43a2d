// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Indicators driven through the Linux LED class (`/sys/class/leds/`).
//!
//! Each LED directory exposes a `brightness` file (0 = off) and a
//! `max_brightness` file. Boards name their LEDs differently, so the
//! mapping from [`Indicator`] to LED name is configurable; the default
//! follows the red/green/blue/yellow row of the reference board, with A
//! at the red end.

use crate::{Indicator, IndicatorBank, IndicatorError};
use std::path::{Path, PathBuf};

/// Default sysfs directory holding LED class devices.
pub const LED_CLASS_ROOT: &str = "/sys/class/leds";

/// Default LED names for `A..D`.
pub const DEFAULT_LED_NAMES: [&str; 4] = ["red", "green", "blue", "yellow"];

/// An indicator bank backed by sysfs LED files.
#[derive(Debug, Clone)]
pub struct SysfsLeds {
    root: PathBuf,
    names: [String; 4],
    on_level: [u32; 4],
}

impl SysfsLeds {
    /// Uses the default LED class root with the given names for `A..D`.
    pub fn new(names: [String; 4]) -> Self {
        Self::with_root(LED_CLASS_ROOT, names)
    }

    /// Uses a custom root directory (tests, non-standard mounts).
    pub fn with_root(root: impl Into<PathBuf>, names: [String; 4]) -> Self {
        Self {
            root: root.into(),
            names,
            on_level: [1; 4],
        }
    }

    /// LED directory for an indicator.
    pub fn led_dir(&self, indicator: Indicator) -> PathBuf {
        self.root.join(&self.names[indicator.index()])
    }

    fn brightness_path(&self, indicator: Indicator) -> PathBuf {
        self.led_dir(indicator).join("brightness")
    }
}

impl Default for SysfsLeds {
    fn default() -> Self {
        Self::new(DEFAULT_LED_NAMES.map(String::from))
    }
}

impl IndicatorBank for SysfsLeds {
    fn name(&self) -> &str {
        "sysfs"
    }

    /// Checks every LED is present, records its full brightness and
    /// switches it off.
    fn initialize(&mut self) -> Result<(), IndicatorError> {
        for indicator in Indicator::ALL {
            let brightness = self.brightness_path(indicator);
            if !brightness.exists() {
                return Err(IndicatorError::NotAvailable {
                    path: brightness.display().to_string(),
                });
            }
            let max_path = self.led_dir(indicator).join("max_brightness");
            if max_path.exists() {
                self.on_level[indicator.index()] = read_level(&max_path)?.max(1);
            }
            write_level(&brightness, 0)?;
        }
        tracing::debug!("sysfs LEDs ready under {}", self.root.display());
        Ok(())
    }

    fn set(&mut self, indicator: Indicator, on: bool) -> Result<(), IndicatorError> {
        let level = if on { self.on_level[indicator.index()] } else { 0 };
        write_level(&self.brightness_path(indicator), level)
    }
}

fn read_level(path: &Path) -> Result<u32, IndicatorError> {
    let content = std::fs::read_to_string(path).map_err(|e| IndicatorError::ReadError {
        path: path.display().to_string(),
        detail: e.to_string(),
    })?;
    content.trim().parse().map_err(|_| IndicatorError::ReadError {
        path: path.display().to_string(),
        detail: format!("expected integer brightness, got '{}'", content.trim()),
    })
}

fn write_level(path: &Path, level: u32) -> Result<(), IndicatorError> {
    std::fs::write(path, level.to_string()).map_err(|e| IndicatorError::WriteError {
        path: path.display().to_string(),
        source: e,
    })
}
