// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the execution runtime.

/// Errors that can occur while compiling or running a session.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// Partitioning, plan building, or execution driving failed.
    #[error("planner error: {0}")]
    Planner(#[from] partition_planner::PlannerError),

    /// A device call failed.
    #[error("device error: {0}")]
    Device(#[from] device_hal::DeviceError),

    /// A step failed and could not be recovered by the software
    /// fallback.
    #[error("step {step} failed beyond recovery: {detail}")]
    StepFailed { step: usize, detail: String },

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}
