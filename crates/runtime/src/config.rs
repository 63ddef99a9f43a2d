// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Runtime configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! # model_path = "./sine.safetensors"   # built-in sine model when absent
//! arena_size = "2K"
//! planner = "greedy"
//! steps_per_cycle = 20
//! x_range = 6.2831855
//! max_ticks = 100
//! tick_interval_ms = 50
//!
//! [indicators]
//! backend = "sysfs"
//! names = ["red", "green", "blue", "yellow"]
//! ```

use crate::driver::MAX_STEPS_PER_CYCLE;
use crate::RuntimeError;
use arena_planner::PlanningStrategy;
use indicator::{IndicatorBank, MemoryBank, SysfsLeds, DEFAULT_LED_NAMES, LED_CLASS_ROOT};
use memory_manager::ArenaCapacity;
use std::path::{Path, PathBuf};

/// Where display states are sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorBackend {
    /// In-process bank; states are visible only through the log.
    #[default]
    Console,
    /// Linux LED class devices.
    Sysfs,
}

/// Indicator hardware selection.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct IndicatorConfig {
    #[serde(default)]
    pub backend: IndicatorBackend,
    /// LED names for indicators A..D (sysfs only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub names: Option<[String; 4]>,
    /// Overrides `/sys/class/leds` (sysfs only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub led_root: Option<PathBuf>,
}

/// Configuration for the inference loop.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RuntimeConfig {
    /// Descriptor file; the built-in sine model is used when `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_path: Option<PathBuf>,
    /// Arena capacity (human-readable, e.g. `"2K"`).
    #[serde(default = "default_arena_size")]
    pub arena_size: String,
    /// Planning strategy name: `"linear"` or `"greedy"`.
    #[serde(default = "default_planner")]
    pub planner: String,
    /// Ticks per sweep of the input range.
    #[serde(default = "default_steps_per_cycle")]
    pub steps_per_cycle: u32,
    /// Span of input values covered by one cycle.
    #[serde(default = "default_x_range")]
    pub x_range: f32,
    /// Stop after this many ticks; run forever when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_ticks: Option<u64>,
    /// Pause between ticks in milliseconds.
    #[serde(default)]
    pub tick_interval_ms: u64,
    #[serde(default)]
    pub indicators: IndicatorConfig,
}

fn default_arena_size() -> String {
    "2K".to_string()
}

fn default_planner() -> String {
    "greedy".to_string()
}

fn default_steps_per_cycle() -> u32 {
    20
}

fn default_x_range() -> f32 {
    model_ir::SINE_X_RANGE
}

impl RuntimeConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, RuntimeError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RuntimeError::ConfigError(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, RuntimeError> {
        toml::from_str(toml_str)
            .map_err(|e| RuntimeError::ConfigError(format!("TOML parse error: {e}")))
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, RuntimeError> {
        toml::to_string_pretty(self)
            .map_err(|e| RuntimeError::ConfigError(format!("TOML serialise error: {e}")))
    }

    /// Parses the arena size string.
    pub fn parse_capacity(&self) -> Result<ArenaCapacity, RuntimeError> {
        ArenaCapacity::parse(&self.arena_size)
            .map_err(|e| RuntimeError::ConfigError(format!("invalid arena size: {e}")))
    }

    /// Creates the planning strategy named by `planner`.
    pub fn create_planner(&self) -> Result<Box<dyn PlanningStrategy>, RuntimeError> {
        arena_planner::strategy_by_name(&self.planner.to_lowercase())
            .map_err(|e| RuntimeError::ConfigError(e.to_string()))
    }

    /// Creates the indicator bank for the configured backend.
    pub fn create_indicator_bank(&self) -> Box<dyn IndicatorBank> {
        match self.indicators.backend {
            IndicatorBackend::Console => Box::new(MemoryBank::new()),
            IndicatorBackend::Sysfs => {
                let root = self
                    .indicators
                    .led_root
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(LED_CLASS_ROOT));
                let names = self
                    .indicators
                    .names
                    .clone()
                    .unwrap_or_else(|| DEFAULT_LED_NAMES.map(String::from));
                let leds = SysfsLeds::with_root(root, names);
                Box::new(leds)
            }
        }
    }

    /// Checks every field without touching the filesystem.
    pub fn validate(&self) -> Result<(), RuntimeError> {
        self.parse_capacity()?;
        self.create_planner()?;
        if self.steps_per_cycle == 0 || self.steps_per_cycle > MAX_STEPS_PER_CYCLE {
            return Err(RuntimeError::ConfigError(format!(
                "steps_per_cycle must be in 1..={MAX_STEPS_PER_CYCLE}, got {}",
                self.steps_per_cycle
            )));
        }
        if !self.x_range.is_finite() || self.x_range <= 0.0 {
            return Err(RuntimeError::ConfigError(format!(
                "x_range must be finite and positive, got {}",
                self.x_range
            )));
        }
        if let Some(names) = &self.indicators.names {
            if names.iter().any(|n| n.is_empty() || n.contains('/')) {
                return Err(RuntimeError::ConfigError(format!(
                    "invalid indicator names {names:?}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            arena_size: default_arena_size(),
            planner: default_planner(),
            steps_per_cycle: default_steps_per_cycle(),
            x_range: default_x_range(),
            max_ticks: None,
            tick_interval_ms: 0,
            indicators: IndicatorConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let c = RuntimeConfig::default();
        assert_eq!(c.arena_size, "2K");
        assert_eq!(c.planner, "greedy");
        assert_eq!(c.steps_per_cycle, 20);
        assert_eq!(c.indicators.backend, IndicatorBackend::Console);
        c.validate().unwrap();
    }

    #[test]
    fn test_parse_capacity() {
        let c = RuntimeConfig {
            arena_size: "4K".into(),
            ..Default::default()
        };
        assert_eq!(c.parse_capacity().unwrap().as_bytes(), 4096);
        assert_eq!(RuntimeConfig::default().parse_capacity().unwrap().as_bytes(), 2048);
    }

    #[test]
    fn test_from_toml() {
        let toml = r#"
model_path = "/tmp/sine.safetensors"
arena_size = "1K"
planner = "linear"
steps_per_cycle = 50
max_ticks = 7

[indicators]
backend = "sysfs"
names = ["led0", "led1", "led2", "led3"]
"#;
        let c = RuntimeConfig::from_toml(toml).unwrap();
        assert_eq!(c.model_path, Some(PathBuf::from("/tmp/sine.safetensors")));
        assert_eq!(c.arena_size, "1K");
        assert_eq!(c.planner, "linear");
        assert_eq!(c.steps_per_cycle, 50);
        assert_eq!(c.max_ticks, Some(7));
        assert_eq!(c.x_range, model_ir::SINE_X_RANGE);
        assert_eq!(c.indicators.backend, IndicatorBackend::Sysfs);
        assert_eq!(c.indicators.names.as_ref().unwrap()[3], "led3");
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let c = RuntimeConfig::from_toml("").unwrap();
        assert_eq!(c, RuntimeConfig::default());
    }

    #[test]
    fn test_to_toml_roundtrip() {
        let c = RuntimeConfig {
            max_ticks: Some(10),
            indicators: IndicatorConfig {
                backend: IndicatorBackend::Sysfs,
                names: None,
                led_root: Some(PathBuf::from("/tmp/leds")),
            },
            ..Default::default()
        };
        let toml = c.to_toml().unwrap();
        let back = RuntimeConfig::from_toml(&toml).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn test_create_planner() {
        let c = RuntimeConfig {
            planner: "Linear".into(),
            ..Default::default()
        };
        assert_eq!(c.create_planner().unwrap().name(), "linear");
        assert_eq!(
            RuntimeConfig::default().create_planner().unwrap().name(),
            "greedy-reuse"
        );
    }

    #[test]
    fn test_create_planner_unknown() {
        let c = RuntimeConfig {
            planner: "bogus".into(),
            ..Default::default()
        };
        assert!(matches!(c.create_planner(), Err(RuntimeError::ConfigError(_))));
    }

    #[test]
    fn test_create_indicator_bank() {
        assert_eq!(RuntimeConfig::default().create_indicator_bank().name(), "memory");
        let c = RuntimeConfig {
            indicators: IndicatorConfig {
                backend: IndicatorBackend::Sysfs,
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(c.create_indicator_bank().name(), "sysfs");
    }

    #[test]
    fn test_validate_rejects() {
        let bad = [
            RuntimeConfig {
                steps_per_cycle: 0,
                ..Default::default()
            },
            RuntimeConfig {
                x_range: f32::NAN,
                ..Default::default()
            },
            RuntimeConfig {
                arena_size: "lots".into(),
                ..Default::default()
            },
            RuntimeConfig {
                indicators: IndicatorConfig {
                    names: Some(["a".into(), "".into(), "c".into(), "d".into()]),
                    ..Default::default()
                },
                ..Default::default()
            },
        ];
        for c in bad {
            assert!(c.validate().is_err(), "{c:?}");
        }
    }
}
