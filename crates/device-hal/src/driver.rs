// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The compile/execute contracts a compute backend implements.
//!
//! The planner only ever talks to a device through these two traits:
//! [`DeviceDriver`] answers capability queries and compiles sub-graphs,
//! [`PreparedModel`] runs a compiled sub-graph over a [`StepIo`]. Both
//! calls are synchronous round-trips; the planner awaits each before
//! proceeding, so compilation of step N+1 never overlaps step N.

use crate::{Capabilities, DeviceError};
use graph_ir::Graph;
use std::sync::Arc;

/// The byte buffers for one step execution.
///
/// `inputs[i]` corresponds to the sub-graph's i-th input operand and
/// `outputs[i]` to its i-th output operand, in the sub-graph's
/// identified order.
#[derive(Debug, Default)]
pub struct StepIo {
    /// Input bytes, one buffer per sub-graph input.
    pub inputs: Vec<Vec<u8>>,
    /// Output bytes, one buffer per sub-graph output. Pre-sized by the
    /// caller; the device fills them in place.
    pub outputs: Vec<Vec<u8>>,
}

impl StepIo {
    /// Checks that the buffer counts match a sub-graph's ports.
    pub fn check_against(&self, graph: &Graph) -> Result<(), DeviceError> {
        if self.inputs.len() != graph.inputs().len() || self.outputs.len() != graph.outputs().len()
        {
            return Err(DeviceError::IoMismatch(format!(
                "graph '{}' expects {} inputs / {} outputs, got {} / {}",
                graph.name(),
                graph.inputs().len(),
                graph.outputs().len(),
                self.inputs.len(),
                self.outputs.len(),
            )));
        }
        Ok(())
    }
}

/// A sub-graph compiled for one device, ready to run.
pub trait PreparedModel: Send + Sync {
    /// Runs the compiled sub-graph over the given buffers.
    fn run(&self, io: &mut StepIo) -> Result<(), DeviceError>;
}

/// The capability oracle and compiler for one accelerator.
///
/// Implementations wrap a vendor backend; the planner queries each
/// driver once per partitioning pass and compiles at most one sub-graph
/// per step.
pub trait DeviceDriver: Send + Sync {
    /// Stable device name for logs and summaries.
    fn name(&self) -> &str;

    /// The device's performance figures.
    fn capabilities(&self) -> Capabilities;

    /// Which operations of `graph` this device can execute, one flag
    /// per operation in operation-index order.
    fn supported_operations(&self, graph: &Graph) -> Result<Vec<bool>, DeviceError>;

    /// Compiles a sub-graph for this device.
    fn prepare(&self, graph: &Graph) -> Result<Arc<dyn PreparedModel>, DeviceError>;
}
