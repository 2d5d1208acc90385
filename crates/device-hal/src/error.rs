// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for device queries, compilation, and execution.

/// Errors that can occur when talking to a compute device.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// The per-operation support query failed in transport.
    #[error("capability query failed on device '{device}': {detail}")]
    QueryFailed { device: String, detail: String },

    /// Compiling a sub-graph on the device failed.
    #[error("compilation failed on device '{device}': {detail}")]
    PrepareFailed { device: String, detail: String },

    /// Running a prepared sub-graph on the device failed.
    #[error("execution failed on device '{device}': {detail}")]
    ExecutionFailed { device: String, detail: String },

    /// A device id does not exist in the registry.
    #[error("unknown device id {0}")]
    UnknownDevice(usize),

    /// The step I/O handed to a prepared model does not match its graph.
    #[error("step i/o mismatch: {0}")]
    IoMismatch(String),
}
