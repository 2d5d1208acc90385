// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Best-device assignment: one target per operation.
//!
//! Each device's support bitmap is fetched exactly once per
//! partitioning pass. For every operation, the supporting device with
//! the best score wins — lower execution time under a "fast"
//! preference, lower power usage under "low power" — scored against the
//! performance entry matching the operation's first input operand type.
//! The first device with a strictly better score wins, so ties keep the
//! earlier-registered device. An operation no device supports goes to
//! the software fallback.

use device_hal::{DeviceRegistry, ExecutionPreference, Target};
use graph_ir::{Graph, OperandType};

/// Picks the best execution target for every operation in the graph.
///
/// Transport failures on the support query are logged and treated as
/// an all-false bitmap for that device; they never fail the pass.
pub fn find_best_targets(
    graph: &Graph,
    registry: &DeviceRegistry,
    preference: ExecutionPreference,
) -> Vec<Target> {
    let operation_count = graph.operation_count();

    // One support bitmap and capability report per device, fetched once.
    let mut support = Vec::with_capacity(registry.device_count());
    let mut capabilities = Vec::with_capacity(registry.device_count());
    for (_id, driver) in registry.iter() {
        let bitmap = match driver.supported_operations(graph) {
            Ok(bitmap) if bitmap.len() == operation_count => bitmap,
            Ok(bitmap) => {
                tracing::error!(
                    device = driver.name(),
                    got = bitmap.len(),
                    want = operation_count,
                    "support bitmap has wrong length, ignoring device"
                );
                vec![false; operation_count]
            }
            Err(error) => {
                tracing::error!(
                    device = driver.name(),
                    %error,
                    "support query failed, ignoring device"
                );
                vec![false; operation_count]
            }
        };
        support.push(bitmap);
        capabilities.push(driver.capabilities());
    }

    let mut targets = Vec::with_capacity(operation_count);
    for (op_index, operation) in graph.operations().iter().enumerate() {
        let score_type = operation
            .inputs
            .first()
            .and_then(|&i| graph.operand(i))
            .map(|o| o.operand_type)
            .unwrap_or(OperandType::TensorFloat32);

        let mut best: Option<(usize, f32)> = None;
        for (device, (bitmap, caps)) in support.iter().zip(&capabilities).enumerate() {
            if !bitmap[op_index] {
                continue;
            }
            let score = preference.score(caps.performance_for(score_type));
            match best {
                Some((_, best_score)) if score >= best_score => {}
                _ => best = Some((device, score)),
            }
        }

        let target = match best {
            Some((device, score)) => {
                let target = Target::Accelerator(device_hal::DeviceId::new(device));
                tracing::debug!(
                    operation = op_index,
                    opcode = %operation.operation_type,
                    device = %registry.target_name(target),
                    score,
                    "operation assigned"
                );
                target
            }
            None => {
                tracing::debug!(
                    operation = op_index,
                    opcode = %operation.operation_type,
                    "no device support, assigned to cpu"
                );
                Target::Cpu
            }
        };
        targets.push(target);
    }
    targets
}
