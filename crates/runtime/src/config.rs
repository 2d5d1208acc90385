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
//! preference = "fast-single-answer"
//! enable_partitioning = true
//! enable_profiling = true
//! ```

use device_hal::ExecutionPreference;
use std::path::Path;

/// Configuration for an execution session.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RuntimeConfig {
    /// Planner preference: `"fast-single-answer"` or `"low-power"`.
    pub preference: String,
    /// Whether to split work across accelerators. When disabled the
    /// whole graph runs on the software path.
    #[serde(default = "default_true")]
    pub enable_partitioning: bool,
    /// Whether to collect per-step timing metrics.
    #[serde(default = "default_true")]
    pub enable_profiling: bool,
}

fn default_true() -> bool {
    true
}

impl RuntimeConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, super::RuntimeError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            super::RuntimeError::ConfigError(format!(
                "cannot read config '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, super::RuntimeError> {
        toml::from_str(toml_str)
            .map_err(|e| super::RuntimeError::ConfigError(format!("TOML parse error: {e}")))
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, super::RuntimeError> {
        toml::to_string_pretty(self)
            .map_err(|e| super::RuntimeError::ConfigError(format!("TOML serialise error: {e}")))
    }

    /// Parses the preference string into an [`ExecutionPreference`].
    pub fn parse_preference(&self) -> Result<ExecutionPreference, super::RuntimeError> {
        ExecutionPreference::from_str_loose(&self.preference).ok_or_else(|| {
            super::RuntimeError::ConfigError(format!(
                "unknown preference '{}'; expected 'fast-single-answer' or 'low-power'",
                self.preference
            ))
        })
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            preference: "fast-single-answer".to_string(),
            enable_partitioning: true,
            enable_profiling: true,
        }
    }
}
