// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Shared helpers for the planner's unit tests: a configurable fake
//! device driver and small graph constructors.

use device_hal::{Capabilities, DeviceDriver, DeviceError, PreparedModel, StepIo};
use graph_ir::{Graph, GraphBuilder, OperandType, OperationType};
use std::collections::HashSet;
use std::sync::Arc;

/// A fake driver with a fixed supported-opcode set.
pub(crate) struct TestDriver {
    name: &'static str,
    capabilities: Capabilities,
    supported: HashSet<OperationType>,
    fail_query: bool,
}

impl TestDriver {
    pub fn supporting(
        name: &'static str,
        opcodes: &[OperationType],
        capabilities: Capabilities,
    ) -> Self {
        Self {
            name,
            capabilities,
            supported: opcodes.iter().copied().collect(),
            fail_query: false,
        }
    }

    pub fn broken_query(name: &'static str) -> Self {
        Self {
            name,
            capabilities: Capabilities::uniform(1.0),
            supported: HashSet::new(),
            fail_query: true,
        }
    }
}

struct NoopPrepared;

impl PreparedModel for NoopPrepared {
    fn run(&self, _io: &mut StepIo) -> Result<(), DeviceError> {
        Ok(())
    }
}

impl DeviceDriver for TestDriver {
    fn name(&self) -> &str {
        self.name
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn supported_operations(&self, graph: &Graph) -> Result<Vec<bool>, DeviceError> {
        if self.fail_query {
            return Err(DeviceError::QueryFailed {
                device: self.name.to_string(),
                detail: "transport closed".to_string(),
            });
        }
        Ok(graph
            .operations()
            .iter()
            .map(|op| self.supported.contains(&op.operation_type))
            .collect())
    }

    fn prepare(&self, _graph: &Graph) -> Result<Arc<dyn PreparedModel>, DeviceError> {
        Ok(Arc::new(NoopPrepared))
    }
}

/// Builds a registry from test drivers.
pub(crate) fn test_registry(drivers: Vec<TestDriver>) -> Arc<device_hal::DeviceRegistry> {
    Arc::new(device_hal::DeviceRegistry::new(
        drivers
            .into_iter()
            .map(|d| Arc::new(d) as Arc<dyn DeviceDriver>)
            .collect(),
    ))
}

/// A linear chain: one model input, one opcode per link, one model
/// output. Intermediate operands are temporaries.
pub(crate) fn chain_graph(opcodes: &[OperationType]) -> Graph {
    let mut b = GraphBuilder::new("chain");
    let mut current = b.add_operand(OperandType::TensorFloat32, &[1, 8], 0.0, 0);
    let input = current;
    for &opcode in opcodes {
        let next = b.add_operand(OperandType::TensorFloat32, &[1, 8], 0.0, 0);
        b.add_operation(opcode, &[current], &[next]).unwrap();
        current = next;
    }
    b.identify_inputs_outputs(&[input], &[current]).unwrap();
    b.finish().unwrap()
}

/// The two-level graph `out = op1(op0(a, b), c)`.
///
/// Returns the graph plus the operand indices
/// `(a, b, c, intermediate, out)`.
pub(crate) fn two_level_graph(
    op0: OperationType,
    op1: OperationType,
) -> (Arc<Graph>, [usize; 5]) {
    let mut b = GraphBuilder::new("two-level");
    let a = b.add_operand(OperandType::TensorFloat32, &[1, 4], 0.0, 0);
    let bb = b.add_operand(OperandType::TensorFloat32, &[1, 4], 0.0, 0);
    let c = b.add_operand(OperandType::TensorFloat32, &[1, 4], 0.0, 0);
    let mid = b.add_operand(OperandType::TensorFloat32, &[1, 4], 0.0, 0);
    let out = b.add_operand(OperandType::TensorFloat32, &[1, 4], 0.0, 0);
    b.add_operation(op0, &[a, bb], &[mid]).unwrap();
    b.add_operation(op1, &[mid, c], &[out]).unwrap();
    b.identify_inputs_outputs(&[a, bb, c], &[out]).unwrap();
    (Arc::new(b.finish().unwrap()), [a, bb, c, mid, out])
}
