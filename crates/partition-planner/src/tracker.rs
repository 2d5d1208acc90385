// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Readiness tracking over a graph's data dependencies.
//!
//! [`OperandTracker`] counts, for every operation, how many of its
//! inputs are not yet known — inputs whose lifetime is
//! `TemporaryVariable` or `ModelOutput`, i.e. values some operation
//! still has to produce. Constants and model inputs are known
//! immediately. An operation becomes *ready* when its unknown count
//! reaches zero; readiness is reported through a plain closure, once
//! per operation.
//!
//! The sweep has exactly two phases: seed (construction fires every
//! operation with no unknown inputs, in operation-index order) and
//! propagate ([`OperandTracker::mark_processed`] decrements consumers of
//! a processed operation's outputs). Each (operand, consumer) edge is
//! registered exactly once and decremented exactly once, so no
//! operation is ever double-fired.

use graph_ir::Graph;
use std::collections::HashMap;
use std::sync::Arc;

/// Tracks how many not-yet-known inputs each operation has.
pub struct OperandTracker {
    graph: Arc<Graph>,
    /// Remaining unknown inputs per operation.
    unknown_inputs: Vec<usize>,
    /// operand index → operations consuming it, one entry per input
    /// occurrence.
    consumers: HashMap<usize, Vec<usize>>,
    /// Operations already marked processed; repeats are inert.
    processed: Vec<bool>,
}

impl OperandTracker {
    /// Seeds the tracker and fires `on_ready` for every operation whose
    /// inputs are all known at construction, in operation-index order.
    pub fn new(graph: &Arc<Graph>, mut on_ready: impl FnMut(usize)) -> Self {
        let operation_count = graph.operation_count();
        let mut unknown_inputs = vec![0usize; operation_count];
        let mut consumers: HashMap<usize, Vec<usize>> = HashMap::new();

        for (op_index, operation) in graph.operations().iter().enumerate() {
            for &input in &operation.inputs {
                // Finished graphs only hold valid indices.
                let Some(operand) = graph.operand(input) else {
                    continue;
                };
                if operand.lifetime.is_produced_in_graph() {
                    unknown_inputs[op_index] += 1;
                    consumers.entry(input).or_default().push(op_index);
                }
            }
        }

        for (op_index, &count) in unknown_inputs.iter().enumerate() {
            if count == 0 {
                on_ready(op_index);
            }
        }

        Self {
            graph: Arc::clone(graph),
            unknown_inputs,
            consumers,
            processed: vec![false; operation_count],
        }
    }

    /// Remaining unknown-input count for an operation.
    pub fn unknown_inputs(&self, op_index: usize) -> Option<usize> {
        self.unknown_inputs.get(op_index).copied()
    }

    /// Marks an operation as processed: every consumer of its outputs
    /// loses one unknown input, and `on_ready` fires for consumers that
    /// reach zero. Marking the same operation again does nothing.
    pub fn mark_processed(&mut self, op_index: usize, mut on_ready: impl FnMut(usize)) {
        match self.processed.get_mut(op_index) {
            Some(flag) if !*flag => *flag = true,
            _ => return,
        }
        let graph = Arc::clone(&self.graph);
        let Some(operation) = graph.operation(op_index) else {
            return;
        };
        for &output in &operation.outputs {
            let Some(consumers) = self.consumers.get(&output) else {
                continue;
            };
            for &consumer in consumers {
                let count = &mut self.unknown_inputs[consumer];
                debug_assert!(*count > 0, "consumer decremented below zero");
                *count -= 1;
                if *count == 0 {
                    on_ready(consumer);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graph_ir::{GraphBuilder, OperandType, OperationType};

    /// out0 = relu(a); out1 = add(out0, b); out2 = mul(out1, out0)
    fn diamond_graph() -> Arc<Graph> {
        let mut b = GraphBuilder::new("diamond");
        let a = b.add_operand(OperandType::TensorFloat32, &[4], 0.0, 0);
        let bb = b.add_operand(OperandType::TensorFloat32, &[4], 0.0, 0);
        let t0 = b.add_operand(OperandType::TensorFloat32, &[4], 0.0, 0);
        let t1 = b.add_operand(OperandType::TensorFloat32, &[4], 0.0, 0);
        let out = b.add_operand(OperandType::TensorFloat32, &[4], 0.0, 0);
        b.add_operation(OperationType::Relu, &[a], &[t0]).unwrap();
        b.add_operation(OperationType::Add, &[t0, bb], &[t1]).unwrap();
        b.add_operation(OperationType::Mul, &[t1, t0], &[out]).unwrap();
        b.identify_inputs_outputs(&[a, bb], &[out]).unwrap();
        Arc::new(b.finish().unwrap())
    }

    #[test]
    fn test_seed_fires_ready_operations_in_order() {
        let graph = diamond_graph();
        let mut ready = Vec::new();
        let _tracker = OperandTracker::new(&graph, |op| ready.push(op));
        // Only op 0 has all-known inputs.
        assert_eq!(ready, vec![0]);
    }

    #[test]
    fn test_propagation() {
        let graph = diamond_graph();
        let mut ready = Vec::new();
        let mut tracker = OperandTracker::new(&graph, |op| ready.push(op));

        tracker.mark_processed(0, |op| ready.push(op));
        // t0 feeds op1 (needs it once) and op2 (still waits on t1).
        assert_eq!(ready, vec![0, 1]);
        assert_eq!(tracker.unknown_inputs(2), Some(1));

        tracker.mark_processed(1, |op| ready.push(op));
        assert_eq!(ready, vec![0, 1, 2]);
    }

    #[test]
    fn test_no_double_fire() {
        let graph = diamond_graph();
        let mut fired = vec![0usize; 3];
        let mut tracker = OperandTracker::new(&graph, |op| fired[op] += 1);
        tracker.mark_processed(0, |op| fired[op] += 1);
        tracker.mark_processed(1, |op| fired[op] += 1);
        tracker.mark_processed(2, |op| fired[op] += 1);
        assert_eq!(fired, vec![1, 1, 1]);
    }

    #[test]
    fn test_multiple_seed_fires() {
        // Two independent operations over model inputs: both fire at seed.
        let mut b = GraphBuilder::new("parallel");
        let a = b.add_operand(OperandType::TensorFloat32, &[2], 0.0, 0);
        let c = b.add_operand(OperandType::TensorFloat32, &[2], 0.0, 0);
        let o0 = b.add_operand(OperandType::TensorFloat32, &[2], 0.0, 0);
        let o1 = b.add_operand(OperandType::TensorFloat32, &[2], 0.0, 0);
        b.add_operation(OperationType::Relu, &[a], &[o0]).unwrap();
        b.add_operation(OperationType::Logistic, &[c], &[o1]).unwrap();
        b.identify_inputs_outputs(&[a, c], &[o0, o1]).unwrap();
        let graph = Arc::new(b.finish().unwrap());

        let mut ready = Vec::new();
        let _tracker = OperandTracker::new(&graph, |op| ready.push(op));
        assert_eq!(ready, vec![0, 1]);
    }

    #[test]
    fn test_duplicate_input_counted_twice() {
        // add(t, t): the consumer registers two edges on one operand.
        let mut b = GraphBuilder::new("dup");
        let a = b.add_operand(OperandType::TensorFloat32, &[2], 0.0, 0);
        let t = b.add_operand(OperandType::TensorFloat32, &[2], 0.0, 0);
        let out = b.add_operand(OperandType::TensorFloat32, &[2], 0.0, 0);
        b.add_operation(OperationType::Relu, &[a], &[t]).unwrap();
        b.add_operation(OperationType::Add, &[t, t], &[out]).unwrap();
        b.identify_inputs_outputs(&[a], &[out]).unwrap();
        let graph = Arc::new(b.finish().unwrap());

        let mut ready = Vec::new();
        let mut tracker = OperandTracker::new(&graph, |op| ready.push(op));
        assert_eq!(tracker.unknown_inputs(1), Some(2));
        tracker.mark_processed(0, |op| ready.push(op));
        // Both edges decrement in the same sweep; op 1 fires exactly once.
        assert_eq!(ready, vec![0, 1]);
    }

    #[test]
    fn test_repeated_mark_processed_is_inert() {
        let graph = diamond_graph();
        let mut ready = Vec::new();
        let mut tracker = OperandTracker::new(&graph, |op| ready.push(op));

        tracker.mark_processed(0, |op| ready.push(op));
        assert_eq!(ready, vec![0, 1]);
        assert_eq!(tracker.unknown_inputs(2), Some(1));

        // A second mark of op 0 must not decrement op 2 again or
        // underflow op 1's exhausted counter.
        tracker.mark_processed(0, |op| ready.push(op));
        assert_eq!(ready, vec![0, 1]);
        assert_eq!(tracker.unknown_inputs(1), Some(0));
        assert_eq!(tracker.unknown_inputs(2), Some(1));

        tracker.mark_processed(1, |op| ready.push(op));
        assert_eq!(ready, vec![0, 1, 2]);
    }
}
