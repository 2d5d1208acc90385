// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The software execution path.
//!
//! Numerical kernels are out of scope for this runtime; what matters
//! for planning and driving is that every step can run *somewhere*.
//! [`run_reference`] is that somewhere: a deterministic byte-level
//! stand-in that consumes the step's gathered inputs and fills its
//! outputs, exercising the full gather/run/scatter lifecycle. A real
//! deployment would swap this for an interpreter over the graph's
//! opcodes.

use crate::RuntimeError;
use device_hal::StepIo;
use graph_ir::Graph;

/// Runs a graph on the software path over the given buffers.
///
/// Each output byte is the wrapping sum of one byte from every input
/// buffer, indexed modulo that buffer's length. Deterministic, so a
/// fallback re-run of a step produces identical bytes to a first run.
pub fn run_reference(graph: &Graph, io: &mut StepIo) -> Result<(), RuntimeError> {
    io.check_against(graph).map_err(RuntimeError::Device)?;
    tracing::trace!(graph = graph.name(), "running software reference");

    for output in &mut io.outputs {
        for (i, byte) in output.iter_mut().enumerate() {
            let mut acc = 0u8;
            for input in &io.inputs {
                if !input.is_empty() {
                    acc = acc.wrapping_add(input[i % input.len()]);
                }
            }
            *byte = acc;
        }
    }
    Ok(())
}
