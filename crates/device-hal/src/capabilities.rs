// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Device performance figures and the execution preference that ranks them.
//!
//! A device reports two performance entries, one for float32 work and
//! one for quantized8 work. Each entry is a pair of relative figures:
//! execution time and power usage, lower is better. The caller's
//! [`ExecutionPreference`] chooses which figure the planner scores by.

use graph_ir::OperandType;

/// Relative performance figures for one class of computation.
///
/// Both values are relative to the software fallback; lower is better.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PerformanceInfo {
    /// Relative execution time.
    pub exec_time: f32,
    /// Relative power usage.
    pub power_usage: f32,
}

impl PerformanceInfo {
    /// A performance entry with identical time and power figures.
    pub fn uniform(value: f32) -> Self {
        Self {
            exec_time: value,
            power_usage: value,
        }
    }
}

/// The capability report of a single device.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Capabilities {
    /// Performance for float32 scalars and tensors.
    pub float32_performance: PerformanceInfo,
    /// Performance for integer and quantized types.
    pub quantized8_performance: PerformanceInfo,
}

impl Capabilities {
    /// Identical performance for both computation classes.
    pub fn uniform(value: f32) -> Self {
        Self {
            float32_performance: PerformanceInfo::uniform(value),
            quantized8_performance: PerformanceInfo::uniform(value),
        }
    }

    /// Looks up the performance entry for an operand type: float32
    /// types score against the float32 entry, everything else against
    /// the quantized8 entry.
    pub fn performance_for(&self, operand_type: OperandType) -> PerformanceInfo {
        if operand_type.is_float() {
            self.float32_performance
        } else {
            self.quantized8_performance
        }
    }
}

/// What the caller wants the planner to optimize for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionPreference {
    /// Minimize execution time.
    #[default]
    FastSingleAnswer,
    /// Minimize power usage.
    LowPower,
}

impl ExecutionPreference {
    /// The figure this preference scores devices by; lower is better.
    pub fn score(&self, performance: PerformanceInfo) -> f32 {
        match self {
            Self::FastSingleAnswer => performance.exec_time,
            Self::LowPower => performance.power_usage,
        }
    }

    /// Parses a preference from a config string.
    ///
    /// Accepts common aliases: `"fast"`, `"fast-single-answer"`,
    /// `"low-power"`, `"power"`.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "fast" | "fast-single-answer" | "fast_single_answer" | "latency" => {
                Some(Self::FastSingleAnswer)
            }
            "low-power" | "low_power" | "power" => Some(Self::LowPower),
            _ => None,
        }
    }

    /// Returns a human-readable label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FastSingleAnswer => "fast-single-answer",
            Self::LowPower => "low-power",
        }
    }
}

impl std::fmt::Display for ExecutionPreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_performance_lookup() {
        let caps = Capabilities {
            float32_performance: PerformanceInfo { exec_time: 0.5, power_usage: 2.0 },
            quantized8_performance: PerformanceInfo { exec_time: 0.25, power_usage: 1.0 },
        };
        assert_eq!(caps.performance_for(OperandType::TensorFloat32).exec_time, 0.5);
        assert_eq!(caps.performance_for(OperandType::Float32).exec_time, 0.5);
        assert_eq!(caps.performance_for(OperandType::TensorQuant8Asymm).exec_time, 0.25);
        assert_eq!(caps.performance_for(OperandType::Int32).exec_time, 0.25);
    }

    #[test]
    fn test_preference_score() {
        let perf = PerformanceInfo { exec_time: 0.5, power_usage: 2.0 };
        assert_eq!(ExecutionPreference::FastSingleAnswer.score(perf), 0.5);
        assert_eq!(ExecutionPreference::LowPower.score(perf), 2.0);
    }

    #[test]
    fn test_from_str_loose() {
        assert_eq!(
            ExecutionPreference::from_str_loose("fast"),
            Some(ExecutionPreference::FastSingleAnswer)
        );
        assert_eq!(
            ExecutionPreference::from_str_loose("LOW-POWER"),
            Some(ExecutionPreference::LowPower)
        );
        assert_eq!(ExecutionPreference::from_str_loose("bogus"), None);
    }

    #[test]
    fn test_serde_roundtrip() {
        let caps = Capabilities::uniform(1.0);
        let json = serde_json::to_string(&caps).unwrap();
        let back: Capabilities = serde_json::from_str(&json).unwrap();
        assert_eq!(caps, back);
    }
}
