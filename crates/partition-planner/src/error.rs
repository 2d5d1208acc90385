// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for partitioning, plan finishing, and execution driving.

/// Errors that can occur in the partition planner.
#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    /// A graph operation failed while extracting a sub-graph.
    #[error("graph error: {0}")]
    Graph(#[from] graph_ir::GraphError),

    /// A device query, compilation, or lookup failed.
    #[error("device error: {0}")]
    Device(#[from] device_hal::DeviceError),

    /// Scratch buffer access failed.
    #[error("scratch memory error: {0}")]
    Memory(#[from] scratch_memory::MemoryError),

    /// An operand already mapped as an operation input was rediscovered
    /// as an output, which would imply split ownership across steps.
    #[error("operand {operand} rediscovered as an output of step {step}")]
    OperandRoleConflict { operand: usize, step: usize },

    /// A step produced a cross-step output whose size is unknown;
    /// unknown sizes cannot be placed in the fixed-size scratch region.
    #[error("step {step} has a sub-model output of unknown size")]
    UnknownOutputSize { step: usize },

    /// A cross-step input has no recorded defining step.
    #[error("cross-step operand {operand} has no defining step")]
    MissingDefiningStep { operand: usize },

    /// No scratch slot was laid out for a cross-step operand.
    #[error("no scratch slot for cross-step operand {operand}")]
    MissingScratchSlot { operand: usize },

    /// The plan did not finish successfully and cannot be executed.
    #[error("plan has not been successfully finished")]
    PlanNotFinished,

    /// The execution-driving protocol was violated.
    #[error("controller misuse: {0}")]
    ControllerMisuse(&'static str),

    /// The caller's request does not match the graph's ports.
    #[error("request mismatch: {0}")]
    RequestMismatch(String),

    /// A plan or step method was called in the wrong state.
    #[error("invalid plan state: {0}")]
    InvalidState(&'static str),
}
