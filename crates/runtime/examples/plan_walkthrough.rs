// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Example: Partition a small graph across a simulated accelerator and
//! the software path.
//!
//! Operations land on the device that supports them, the graph is
//! split into ordered steps, and cross-step temporaries flow through
//! the scratch buffer between device and software steps.
//!
//! ```bash
//! cargo run -p runtime --example plan_walkthrough
//! ```

use device_hal::{
    Capabilities, DeviceDriver, DeviceError, DeviceRegistry, PerformanceInfo, PreparedModel,
    StepIo,
};
use graph_ir::{Graph, GraphBuilder, OperandType, OperationType};
use runtime::{ExecutionSession, RuntimeConfig};
use std::sync::Arc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise tracing.
    tracing_subscriber::fmt()
        .with_env_filter("debug")
        .init();

    // A small pipeline: conv -> conv -> softmax -> conv.
    // The simulated NPU supports convolutions only, so the softmax
    // forces a software step in the middle.
    let graph = build_graph();
    println!("Graph: {}\n", graph.summary());

    let registry = Arc::new(DeviceRegistry::new(vec![
        Arc::new(SimDevice {
            name: "sim-npu",
            capabilities: Capabilities {
                float32_performance: PerformanceInfo { exec_time: 0.4, power_usage: 2.0 },
                quantized8_performance: PerformanceInfo { exec_time: 0.2, power_usage: 1.5 },
            },
        }) as Arc<dyn DeviceDriver>,
    ]));

    let session = ExecutionSession::new(
        RuntimeConfig::default(),
        Arc::clone(&registry),
        Arc::clone(&graph),
    )
    .compile()?;
    println!("{}\n", session.plan().summary(&registry));

    let rt = tokio::runtime::Runtime::new()?;
    let output = rt.block_on(session.run(vec![vec![3, 1, 4, 1]]))?;

    println!("Outputs: {:?}", output.outputs);
    println!("Metrics: {}", output.metrics.summary());
    Ok(())
}

fn build_graph() -> Arc<Graph> {
    let mut b = GraphBuilder::new("walkthrough");
    let input = b.add_operand(OperandType::TensorQuant8Asymm, &[4], 1.0, 0);
    let t0 = b.add_operand(OperandType::TensorQuant8Asymm, &[4], 1.0, 0);
    let t1 = b.add_operand(OperandType::TensorQuant8Asymm, &[4], 1.0, 0);
    let t2 = b.add_operand(OperandType::TensorQuant8Asymm, &[4], 1.0, 0);
    let out = b.add_operand(OperandType::TensorQuant8Asymm, &[4], 1.0, 0);
    b.add_operation(OperationType::Conv2d, &[input], &[t0]).unwrap();
    b.add_operation(OperationType::Conv2d, &[t0], &[t1]).unwrap();
    b.add_operation(OperationType::Softmax, &[t1], &[t2]).unwrap();
    b.add_operation(OperationType::Conv2d, &[t2], &[out]).unwrap();
    b.identify_inputs_outputs(&[input], &[out]).unwrap();
    Arc::new(b.finish().unwrap())
}

/// A simulated accelerator that handles convolutions only and computes
/// the same bytes as the software reference path.
struct SimDevice {
    name: &'static str,
    capabilities: Capabilities,
}

struct SimPrepared {
    graph: Arc<Graph>,
}

impl PreparedModel for SimPrepared {
    fn run(&self, io: &mut StepIo) -> Result<(), DeviceError> {
        runtime::run_reference(&self.graph, io)
            .map_err(|e| DeviceError::ExecutionFailed {
                device: "sim-npu".to_string(),
                detail: e.to_string(),
            })
    }
}

impl DeviceDriver for SimDevice {
    fn name(&self) -> &str {
        self.name
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn supported_operations(&self, graph: &Graph) -> Result<Vec<bool>, DeviceError> {
        Ok(graph
            .operations()
            .iter()
            .map(|op| op.operation_type == OperationType::Conv2d)
            .collect())
    }

    fn prepare(&self, graph: &Graph) -> Result<Arc<dyn PreparedModel>, DeviceError> {
        Ok(Arc::new(SimPrepared {
            graph: Arc::new(graph.clone()),
        }))
    }
}
